/// Scores how incomplete a target's record is. Higher means more work left.
pub trait GapEstimator {
    fn estimate(&self, target_id: &str) -> u32;
}

impl<F> GapEstimator for F
where
    F: Fn(&str) -> u32,
{
    fn estimate(&self, target_id: &str) -> u32 {
        self(target_id)
    }
}
