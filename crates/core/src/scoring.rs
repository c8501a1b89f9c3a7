//! Scoring module - line clear points and the difficulty ramp
//!
//! A multi-row clear scores as a single table lookup; there is no per-row
//! accumulation, no combo and no back-to-back bonus.

use crate::types::{BASE_DROP_MS, LEVEL_DROP_FLOOR_MS, LINE_SCORES, ROWS_PER_LEVEL};

/// Points for clearing `lines` rows at once at `level` (0-based).
///
/// Returns 0 for 0 rows or more than 4.
pub fn line_clear_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines >= LINE_SCORES.len() {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level + 1)
}

/// Automatic drop interval after reaching `level`.
pub fn drop_interval_ms(level: u32) -> u32 {
    BASE_DROP_MS / (level + 1) + LEVEL_DROP_FLOOR_MS
}

/// The ramp advances one level once cumulative rows exceed `(level + 1) * 10`.
pub fn level_up_due(total_rows: u32, level: u32) -> bool {
    total_rows > (level + 1) * ROWS_PER_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_line_scores() {
        assert_eq!(line_clear_score(1, 0), 40);
        assert_eq!(line_clear_score(2, 0), 100);
        assert_eq!(line_clear_score(3, 0), 300);
        assert_eq!(line_clear_score(4, 0), 1200);

        assert_eq!(line_clear_score(1, 5), 40 * 6);
        assert_eq!(line_clear_score(4, 2), 1200 * 3);
    }

    #[test]
    fn test_out_of_range_line_counts_score_nothing() {
        assert_eq!(line_clear_score(0, 3), 0);
        assert_eq!(line_clear_score(5, 0), 0);
    }

    #[test]
    fn test_drop_interval_by_level() {
        assert_eq!(drop_interval_ms(0), 1200);
        assert_eq!(drop_interval_ms(1), 700);
        assert_eq!(drop_interval_ms(3), 450);
        assert_eq!(drop_interval_ms(9), 300);
    }

    #[test]
    fn test_level_up_threshold_is_strict() {
        assert!(!level_up_due(10, 0));
        assert!(level_up_due(11, 0));
        assert!(!level_up_due(20, 1));
        assert!(level_up_due(21, 1));
    }
}
