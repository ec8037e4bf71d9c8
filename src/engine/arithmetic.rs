//! Contribution arithmetic. Amounts are whole currency units.

/// Share of every withdrawal diverted to the social/health contribution pool.
pub const CONTRIBUTION_PERCENT: i64 = 5;

/// `amount * percent / 100`, rounded half away from zero.
pub fn percent_of(amount: i64, percent: i64) -> i64 {
    let scaled = i128::from(amount) * i128::from(percent);
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    rounded as i64
}

/// Sum of `amounts`, or `None` if it does not fit in an `i64`.
pub fn checked_sum(amounts: impl IntoIterator<Item = i64>) -> Option<i64> {
    amounts.into_iter().try_fold(0i64, i64::checked_add)
}

pub fn contribution(amount: i64) -> i64 {
    percent_of(amount, CONTRIBUTION_PERCENT)
}

/// Split an available balance into `(payout, contribution)`.
/// The two parts always add back up to `available`.
pub fn split_withdrawal(available: i64) -> (i64, i64) {
    let contribution = contribution(available);
    (available - contribution, contribution)
}

/// Display figure derived from lifetime earnings. Not a balance.
pub fn health_insurance_display(total_earnings: i64) -> i64 {
    contribution(total_earnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_percent_of_round_amounts() {
        assert_eq!(split_withdrawal(4000), (3800, 200));
        assert_eq!(split_withdrawal(100), (95, 5));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 10 * 0.05 = 0.5
        assert_eq!(contribution(10), 1);
        // 9 * 0.05 = 0.45
        assert_eq!(contribution(9), 0);
        // 30 * 0.05 = 1.5
        assert_eq!(contribution(30), 2);
        assert_eq!(percent_of(-10, 5), -1);
    }

    #[test]
    fn checked_sum_detects_overflow() {
        assert_eq!(checked_sum([1000, 2500, 700]), Some(4200));
        assert_eq!(checked_sum(std::iter::empty()), Some(0));
        let half = i64::MAX / 2 + 1;
        assert_eq!(checked_sum([half, half]), None);
        assert_eq!(checked_sum([i64::MAX, 0]), Some(i64::MAX));
    }

    #[test]
    fn split_is_lossless() {
        for available in [1, 7, 19, 333, 4001, 999_999] {
            let (payout, contribution) = split_withdrawal(available);
            assert_eq!(payout + contribution, available);
        }
    }

    #[test]
    fn display_figure_uses_same_rate() {
        assert_eq!(health_insurance_display(0), 0);
        assert_eq!(health_insurance_display(12_345), 617);
    }

    #[test]
    fn large_amounts_do_not_overflow() {
        assert_eq!(contribution(i64::MAX / 2), percent_of(i64::MAX / 2, 5));
        assert!(contribution(i64::MAX / 2) > 0);
    }
}
