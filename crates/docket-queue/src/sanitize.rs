//! Pre-parse cleanup of queue files.
//!
//! A queue file committed to version control can pick up merge-conflict
//! markers. Those lines are removed before parsing; whatever remains must
//! still be a valid job array.

/// Line prefixes that mark a merge conflict.
pub const MERGE_MARKERS: [&str; 4] = ["<<<<<<<", "=======", ">>>>>>>", "|||||||"];

/// Result of [`strip_merge_markers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub content: String,
    /// Number of marker lines removed.
    pub stripped: usize,
}

impl Sanitized {
    pub fn was_modified(&self) -> bool {
        self.stripped > 0
    }
}

/// Whether a line is a merge-conflict marker, ignoring leading whitespace.
pub fn is_merge_marker(line: &str) -> bool {
    let line = line.trim_start();
    MERGE_MARKERS.iter().any(|m| line.starts_with(m))
}

/// Drop every merge-marker line from `raw`.
pub fn strip_merge_markers(raw: &str) -> Sanitized {
    let mut content = String::with_capacity(raw.len());
    let mut stripped = 0;
    for line in raw.lines() {
        if is_merge_marker(line) {
            stripped += 1;
            continue;
        }
        content.push_str(line);
        content.push('\n');
    }
    Sanitized { content, stripped }
}
