use progression_types::LevelProgress;

pub struct LevelingCurve;

impl LevelingCurve {
    /// XP needed to advance from `level` to `level + 1`.
    ///
    /// Geometric curve: `floor(100 * 1.5^(level - 1))`, so level 1 -> 2
    /// costs 100 XP, 2 -> 3 costs 150, 3 -> 4 costs 225, and so on.
    pub fn xp_required_for_level(level: i32) -> i64 {
        debug_assert!(level >= 1, "levels start at 1");
        (100.0 * 1.5f64.powi(level - 1)).floor() as i64
    }

    /// Derive the level for a cumulative XP total.
    ///
    /// Walks up from level 1, consuming each level's threshold while the
    /// remainder covers it. Terminates for any finite non-negative XP
    /// because the thresholds grow geometrically.
    pub fn level_from_xp(xp: i64) -> i32 {
        let mut level = 1;
        let mut remaining = xp;
        loop {
            let needed = Self::xp_required_for_level(level);
            if remaining < needed {
                return level;
            }
            remaining -= needed;
            level += 1;
        }
    }

    /// Cumulative XP needed to have reached `level` (the sum of all
    /// thresholds below it). `level_from_xp` of this value is exactly
    /// `level`.
    pub fn cumulative_xp_to_reach(level: i32) -> i64 {
        (1..level).map(Self::xp_required_for_level).sum()
    }

    /// Progress through the current level.
    ///
    /// The caller must pass a `level` consistent with `level_from_xp(xp)`;
    /// this does not recompute or validate it.
    pub fn progress_within_level(xp: i64, level: i32) -> LevelProgress {
        let current_level_xp = xp - Self::cumulative_xp_to_reach(level);
        let needed_for_next = Self::xp_required_for_level(level);
        let percentage =
            ((current_level_xp as f64 / needed_for_next as f64) * 100.0).min(100.0);

        LevelProgress {
            current_level_xp,
            needed_for_next,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_values() {
        assert_eq!(LevelingCurve::xp_required_for_level(1), 100);
        assert_eq!(LevelingCurve::xp_required_for_level(2), 150);
        assert_eq!(LevelingCurve::xp_required_for_level(3), 225);
        assert_eq!(LevelingCurve::xp_required_for_level(4), 337); // floor(337.5)
        assert_eq!(LevelingCurve::xp_required_for_level(5), 506); // floor(506.25)
    }

    #[test]
    fn test_level_from_xp_boundaries() {
        // xpRequiredForLevel(1) = 100, so 99 XP stays at level 1 and
        // exactly 100 crosses into level 2
        assert_eq!(LevelingCurve::level_from_xp(0), 1);
        assert_eq!(LevelingCurve::level_from_xp(99), 1);
        assert_eq!(LevelingCurve::level_from_xp(100), 2);
        assert_eq!(LevelingCurve::level_from_xp(249), 2);
        assert_eq!(LevelingCurve::level_from_xp(250), 3);
    }

    #[test]
    fn test_monotonicity() {
        let mut last_level = 0;
        for xp in (0..50_000).step_by(7) {
            let level = LevelingCurve::level_from_xp(xp);
            assert!(
                level >= last_level,
                "level dropped from {} to {} at xp {}",
                last_level,
                level,
                xp
            );
            last_level = level;
        }
    }

    #[test]
    fn test_threshold_exactness() {
        for level in 1..=30 {
            let at_threshold = LevelingCurve::cumulative_xp_to_reach(level);
            assert_eq!(
                LevelingCurve::level_from_xp(at_threshold),
                level,
                "exact cumulative XP for level {} should land on it",
                level
            );
            if level > 1 {
                assert_eq!(
                    LevelingCurve::level_from_xp(at_threshold - 1),
                    level - 1,
                    "one XP short of level {} should stay below",
                    level
                );
            }
        }
    }

    #[test]
    fn test_terminates_for_large_xp() {
        // Geometric growth caps the walk well under 100 iterations even
        // for the largest representable totals
        let level = LevelingCurve::level_from_xp(i64::MAX / 2);
        assert!(level > 1);
        assert!(level < 120);
    }

    #[test]
    fn test_progress_within_level() {
        // Fresh record: 0 XP into level 1, 100 needed
        let progress = LevelingCurve::progress_within_level(0, 1);
        assert_eq!(progress.current_level_xp, 0);
        assert_eq!(progress.needed_for_next, 100);
        assert_eq!(progress.percentage, 0.0);

        // Halfway through level 1
        let progress = LevelingCurve::progress_within_level(50, 1);
        assert_eq!(progress.current_level_xp, 50);
        assert!((progress.percentage - 50.0).abs() < f64::EPSILON);

        // 100 XP = start of level 2, 150 needed for level 3
        let progress = LevelingCurve::progress_within_level(100, 2);
        assert_eq!(progress.current_level_xp, 0);
        assert_eq!(progress.needed_for_next, 150);

        // Percentage caps at 100 even if the caller's level lags the xp
        let progress = LevelingCurve::progress_within_level(1_000, 1);
        assert_eq!(progress.percentage, 100.0);
    }
}
