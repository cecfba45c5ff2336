/// Metadata key used as the dedupe key when present.
pub const URL_KEY: &str = "url";

/// Metadata key holding the ingestion timestamp used by retention.
pub const INGESTED_AT_KEY: &str = "ingested_at";

/// Metadata key that opts a document out of ingestion when truthy.
pub const SKIP_KEY: &str = "skip";

/// Metadata key holding the jurisdiction tags of a document.
pub const JURISDICTION_TAGS_KEY: &str = "jurisdiction_tags";

/// Suffix appended to a backing file name to form its lock file.
pub const LOCK_FILE_SUFFIX: &str = ".lock";

/// Suffix appended to a backing file name for atomic rewrites.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Multiplier applied to the required-field count when a record is missing.
pub const MISSING_RECORD_GAP_FACTOR: u32 = 10;
