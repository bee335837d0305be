//! Progress reporting for long-running parses.

/// Rows between two progress reports.
pub const PROGRESS_INTERVAL: usize = 5000;

/// Highest percentage reported before a parse has finished.
pub const MAX_PENDING_PERCENTAGE: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Parsing,
    Complete,
}

/// Snapshot of a running parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseProgress {
    /// Rows parsed so far.
    pub loaded: usize,
    /// Estimated total rows (non-blank lines minus the header).
    pub total: usize,
    pub percentage: u8,
    pub stage: ParseStage,
}

impl ParseProgress {
    pub(crate) fn parsing(loaded: usize, total: usize) -> Self {
        let total = total.max(1);
        let ratio = (loaded as f64 / total as f64 * 100.0).round();
        let percentage = ratio.min(f64::from(MAX_PENDING_PERCENTAGE)) as u8;
        Self {
            loaded,
            total,
            percentage,
            stage: ParseStage::Parsing,
        }
    }

    pub(crate) fn complete(rows: usize) -> Self {
        Self {
            loaded: rows,
            total: rows,
            percentage: 100,
            stage: ParseStage::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == ParseStage::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_capped_until_complete() {
        assert_eq!(ParseProgress::parsing(5000, 10_000).percentage, 50);
        assert_eq!(ParseProgress::parsing(10_000, 10_000).percentage, 95);
        assert_eq!(ParseProgress::parsing(12_000, 10_000).percentage, 95);
        assert_eq!(ParseProgress::complete(10_000).percentage, 100);
        assert!(ParseProgress::complete(1).is_complete());
    }
}
