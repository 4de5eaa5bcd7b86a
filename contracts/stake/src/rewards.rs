use soroban_decimal::Decimal;
use stake_common::{time::ONE_YEAR, utils::elapsed_since};

use crate::storage::{Config, StakePosition};

/// `lock_multiplier` of 1_000_000 leaves the yield of a short lock unchanged.
pub const LOCK_MULTIPLIER_PRECISION: u64 = 1_000_000;

/// The parameters of the reward curve, always read from the current `Config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardCurve {
    pub fixed_apy: u64,
    pub lock_multiplier: u64,
}

impl From<&Config> for RewardCurve {
    fn from(config: &Config) -> Self {
        RewardCurve {
            fixed_apy: config.fixed_apy,
            lock_multiplier: config.lock_multiplier,
        }
    }
}

impl RewardCurve {
    /// Share of the principal paid out over a whole lock of `lock_duration` seconds.
    ///
    /// The APY is prorated to the lock length. A `short_lock` is additionally
    /// scaled by the lock multiplier.
    pub fn total_yield(&self, lock_duration: u64, short_lock: bool) -> Option<Decimal> {
        let annualised = Decimal::bps(self.fixed_apy)
            .checked_mul(Decimal::from_ratio(lock_duration, ONE_YEAR)?)?;

        if !short_lock {
            return Some(annualised);
        }
        annualised.checked_mul(Decimal::from_ratio(
            self.lock_multiplier,
            LOCK_MULTIPLIER_PRECISION,
        )?)
    }

    /// Reward earned by a position `elapsed` seconds after it started.
    ///
    /// Grows with the square of the elapsed share of the lock and stops growing
    /// once the lock has run out.
    pub fn cumulative_reward(
        &self,
        principal: i128,
        lock_duration: u64,
        short_lock: bool,
        elapsed: u64,
    ) -> Option<i128> {
        if principal <= 0 || lock_duration == 0 {
            return Some(0);
        }

        let full_lock_reward = self
            .total_yield(lock_duration, short_lock)?
            .checked_mul_int(principal as u128)?;
        let fraction = Decimal::from_ratio(elapsed.min(lock_duration), lock_duration)?;
        let reward = fraction.checked_pow(2)?.checked_mul_int(full_lock_reward)?;

        i128::try_from(reward).ok()
    }

    /// What a claim at `now` would pay: the cumulative reward minus what was
    /// already collected, never negative.
    pub fn claimable(&self, position: &StakePosition, now: u64) -> Option<i128> {
        let cumulative = self.cumulative_reward(
            position.principal,
            position.lock_duration,
            position.short_lock,
            elapsed_since(now, position.start_time),
        )?;

        Some(
            cumulative
                .checked_sub(position.rewards_collected_total)?
                .max(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    const TOKEN: i128 = 1_000_000_000_000_000_000;
    const HALF_YEAR: u64 = ONE_YEAR / 2;
    const QUARTER: u64 = ONE_YEAR / 4;

    fn default_curve() -> RewardCurve {
        RewardCurve {
            fixed_apy: 5_000,
            lock_multiplier: LOCK_MULTIPLIER_PRECISION,
        }
    }

    fn position(principal: i128, lock_duration: u64, collected: i128) -> StakePosition {
        StakePosition {
            index: 0,
            principal,
            lock_duration,
            short_lock: false,
            start_time: 1_000,
            last_claim_time: 1_000,
            rewards_collected_total: collected,
        }
    }

    #[test]
    fn full_lock_yields_the_apy() {
        assert_eq!(
            default_curve().total_yield(ONE_YEAR, false),
            Some(Decimal::percent(50))
        );
    }

    #[test_case(0 => Some(0) ; "at start")]
    #[test_case(QUARTER => Some(3_125_000_000_000_000_000) ; "quarter")]
    #[test_case(HALF_YEAR => Some(12_500_000_000_000_000_000) ; "half")]
    #[test_case(3 * QUARTER => Some(28_125_000_000_000_000_000) ; "three quarters")]
    #[test_case(ONE_YEAR => Some(50 * TOKEN) ; "full lock")]
    #[test_case(2 * ONE_YEAR => Some(50 * TOKEN) ; "frozen after expiry")]
    fn quadratic_accrual_over_a_year(elapsed: u64) -> Option<i128> {
        default_curve().cumulative_reward(100 * TOKEN, ONE_YEAR, false, elapsed)
    }

    #[test]
    fn equal_intervals_pay_increasing_amounts() {
        let curve = default_curve();
        let mut collected = 0i128;
        let mut previous = 0i128;

        for step in 1..=4u64 {
            let cumulative = curve
                .cumulative_reward(100 * TOKEN, ONE_YEAR, false, step * QUARTER)
                .unwrap();
            let paid = cumulative - collected;
            assert!(paid > previous);
            previous = paid;
            collected = cumulative;
        }
        assert_eq!(collected, 50 * TOKEN);
    }

    #[test]
    fn shorter_lock_earns_prorated_yield() {
        let curve = default_curve();
        // half a year at 50% APY
        assert_eq!(curve.total_yield(HALF_YEAR, true), Some(Decimal::percent(25)));
        assert_eq!(
            curve.cumulative_reward(100 * TOKEN, HALF_YEAR, true, HALF_YEAR),
            Some(25 * TOKEN)
        );
    }

    #[test]
    fn multiplier_scales_only_short_locks() {
        let curve = RewardCurve {
            lock_multiplier: 500_000,
            ..default_curve()
        };

        assert_eq!(curve.total_yield(HALF_YEAR, true), Some(Decimal::bps(1_250)));
        assert_eq!(curve.total_yield(HALF_YEAR, false), Some(Decimal::percent(25)));
        assert_eq!(curve.total_yield(ONE_YEAR, false), Some(Decimal::percent(50)));
    }

    #[test_case(0, ONE_YEAR ; "zero principal")]
    #[test_case(-5, ONE_YEAR ; "negative principal")]
    #[test_case(100, 0 ; "zero lock")]
    fn degenerate_positions_earn_nothing(principal: i128, lock_duration: u64) {
        assert_eq!(
            default_curve().cumulative_reward(principal, lock_duration, false, ONE_YEAR),
            Some(0)
        );
    }

    #[test]
    fn claimable_subtracts_collected_rewards() {
        let curve = default_curve();
        let claimed_half = position(100 * TOKEN, ONE_YEAR, 12_500_000_000_000_000_000);

        assert_eq!(
            curve.claimable(&claimed_half, 1_000 + ONE_YEAR),
            Some(37_500_000_000_000_000_000)
        );
    }

    #[test]
    fn claimable_never_goes_negative() {
        // collected under a higher APY than the current one
        let curve = RewardCurve {
            fixed_apy: 1_000,
            ..default_curve()
        };
        let generous = position(100 * TOKEN, ONE_YEAR, 40 * TOKEN);

        assert_eq!(curve.claimable(&generous, 1_000 + ONE_YEAR), Some(0));
    }

    #[test]
    fn claimable_before_start_is_zero() {
        assert_eq!(
            default_curve().claimable(&position(100 * TOKEN, ONE_YEAR, 0), 10),
            Some(0)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let curve = RewardCurve {
            fixed_apy: u64::MAX,
            ..default_curve()
        };

        assert_eq!(curve.cumulative_reward(i128::MAX, ONE_YEAR, false, ONE_YEAR), None);
    }
}
