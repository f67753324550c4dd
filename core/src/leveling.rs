//! Experience curve.

use crate::types::Amount;

/// Experience needed to advance past `level`: `floor(100 * 1.5^(level-1))`.
pub fn exp_for_level(level: u32) -> Amount {
    let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    // `as` saturates, so absurd levels map to u64::MAX rather than wrapping.
    (100.0 * 1.5f64.powi(exponent)).floor() as Amount
}

/// Result of pushing experience through the level-up loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level:         u32,
    pub exp:           Amount,
    pub levels_gained: u32,
}

/// Add `amount` to `exp` and normalize: while the bar is full, spend the
/// threshold and gain a level. One grant may cross several levels.
pub fn apply_exp(level: u32, exp: Amount, amount: Amount) -> LevelProgress {
    let mut level = level.max(1);
    let mut exp = exp.saturating_add(amount);
    let mut levels_gained = 0;
    loop {
        let needed = exp_for_level(level);
        if exp < needed || level == u32::MAX {
            break;
        }
        exp -= needed;
        level += 1;
        levels_gained += 1;
    }
    LevelProgress { level, exp, levels_gained }
}
