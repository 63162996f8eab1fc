//! Delivery date estimation.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::random::RandomSource;

/// Shortest lead time in days.
pub const MIN_LEAD_DAYS: u32 = 2;

/// Longest lead time in days.
pub const MAX_LEAD_DAYS: u32 = 5;

/// Estimates a delivery date from an order date.
///
/// Adds a lead time drawn from `MIN_LEAD_DAYS..=MAX_LEAD_DAYS`, then moves
/// forward one day at a time while the date falls on a weekend.
pub fn estimate_delivery(order_date: NaiveDate, rng: &dyn RandomSource) -> NaiveDate {
    let lead = rng.next_in_range(MIN_LEAD_DAYS, MAX_LEAD_DAYS);
    let mut date = add_days(order_date, lead);
    while is_weekend(date) {
        date = add_days(date, 1);
    }
    date
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    // Saturates at the calendar maximum.
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_landing_is_kept() {
        // Monday + 2 = Wednesday
        let rng = SequenceRandom::new(vec![2]);
        assert_eq!(estimate_delivery(date(2025, 3, 3), &rng), date(2025, 3, 5));
    }

    #[test]
    fn saturday_landing_moves_to_monday() {
        // Thursday + 2 = Saturday -> Monday
        let rng = SequenceRandom::new(vec![2]);
        assert_eq!(estimate_delivery(date(2025, 3, 6), &rng), date(2025, 3, 10));
    }

    #[test]
    fn sunday_landing_moves_to_monday() {
        // Friday + 2 = Sunday -> Monday
        let rng = SequenceRandom::new(vec![2]);
        assert_eq!(estimate_delivery(date(2025, 3, 7), &rng), date(2025, 3, 10));
    }

    proptest! {
        #[test]
        fn estimate_is_a_weekday_within_window(
            seed in any::<u64>(),
            offset in 0i64..3650,
        ) {
            let order_date = date(2020, 1, 1) + chrono::Duration::days(offset);
            let estimate = estimate_delivery(order_date, &SeededRandom::new(seed));

            let days = (estimate - order_date).num_days();
            prop_assert!((2..=7).contains(&days));
            prop_assert!(!is_weekend(estimate));
        }
    }
}
