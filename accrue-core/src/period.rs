//! Calculation periods derived from a card's billing cycle.
//!
//! Every calculation runs over one period: either a calendar month or a
//! statement cycle anchored to a day of the month. Bounds are inclusive.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::card::{BillingCycle, CreditCard};

/// An inclusive date range a reward calculation runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Year-month of the period start, e.g. "2025-11".
    pub label: String,
}

impl CalculationPeriod {
    /// Whether `date` falls inside the period (both bounds inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the period, counting both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = month_start(date);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    next.pred_opt().map(|d| d.day()).unwrap_or(28)
}

/// The cycle start inside the month containing `date`: the anchor day
/// clamped into 1..=31 and then to the month's length.
fn cycle_start_in_month(date: NaiveDate, anchor: u32) -> NaiveDate {
    let day = anchor.clamp(1, 31).min(days_in_month(date));
    month_start(date).with_day(day).unwrap_or_else(|| month_start(date))
}

/// Computes the period containing `reference` for the given cycle.
///
/// Algorithm (deterministic):
/// 1) Calendar mode: first through last day of the reference month.
/// 2) Billing mode: the cycle starts on the anchored day of the reference
///    month if `reference` is on/after it, otherwise on the anchored day
///    of the previous month. A reference on the anchor day belongs to the
///    cycle starting that day.
/// 3) The period ends the day before the next cycle start. The anchor is
///    re-clamped per month, so day 31 cycles end correctly across short
///    months.
pub fn cycle_period(cycle: BillingCycle, reference: NaiveDate) -> CalculationPeriod {
    match cycle {
        BillingCycle::Calendar => {
            let start = month_start(reference);
            let end = start.with_day(days_in_month(reference)).unwrap_or(start);
            CalculationPeriod {
                start,
                end,
                label: start.format("%Y-%m").to_string(),
            }
        }
        BillingCycle::Billing { day_of_month } => {
            let this_month = cycle_start_in_month(reference, day_of_month);
            let start = if reference >= this_month {
                this_month
            } else {
                let prev_month = month_start(reference).pred_opt().unwrap_or(reference);
                cycle_start_in_month(prev_month, day_of_month)
            };
            let next_month = month_start(start)
                .checked_add_months(Months::new(1))
                .unwrap_or(start);
            let next_start = cycle_start_in_month(next_month, day_of_month);
            let end = next_start.pred_opt().unwrap_or(next_start);
            CalculationPeriod {
                start,
                end,
                label: start.format("%Y-%m").to_string(),
            }
        }
    }
}

/// Computes the period containing `reference` for a card.
pub fn calculate_period(card: &CreditCard, reference: NaiveDate) -> CalculationPeriod {
    cycle_period(card.billing_cycle, reference)
}

/// The last `count` periods for a card, oldest first; the period
/// containing `reference` is the final element. Consecutive periods are
/// contiguous (each starts the day after the previous one ends).
pub fn recent_periods(
    card: &CreditCard,
    reference: NaiveDate,
    count: usize,
) -> Vec<CalculationPeriod> {
    let mut periods = Vec::with_capacity(count);
    let mut cursor = reference;
    for _ in 0..count {
        let period = calculate_period(card, cursor);
        let before_start = period.start.pred_opt();
        periods.push(period);
        match before_start {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    periods.reverse();
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::RewardProgram;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card_with_cycle(cycle: BillingCycle) -> CreditCard {
        CreditCard::new(
            "card-1",
            "Example",
            "acct-1",
            RewardProgram::Cashback { rate_percent: 2.0 },
        )
        .with_billing_cycle(cycle)
    }

    #[test]
    fn test_calendar_period_regular_month() {
        let period = cycle_period(BillingCycle::Calendar, date(2025, 11, 14));
        assert_eq!(period.start, date(2025, 11, 1));
        assert_eq!(period.end, date(2025, 11, 30));
        assert_eq!(period.label, "2025-11");
    }

    #[test]
    fn test_calendar_period_leap_february() {
        let period = cycle_period(BillingCycle::Calendar, date(2024, 2, 10));
        assert_eq!(period.end, date(2024, 2, 29));
        assert_eq!(period.days(), 29);
    }

    #[test]
    fn test_billing_day_31_in_february() {
        let cycle = BillingCycle::Billing { day_of_month: 31 };
        let period = cycle_period(cycle, date(2024, 2, 15));
        assert_eq!(period.start, date(2024, 1, 31));
        assert_eq!(period.end, date(2024, 2, 28));
        assert_eq!(period.label, "2024-01");
    }

    #[test]
    fn test_billing_reference_on_anchor_starts_new_cycle() {
        let cycle = BillingCycle::Billing { day_of_month: 15 };
        let period = cycle_period(cycle, date(2025, 6, 15));
        assert_eq!(period.start, date(2025, 6, 15));
        assert_eq!(period.end, date(2025, 7, 14));
    }

    #[test]
    fn test_billing_reference_before_anchor_uses_previous_cycle() {
        let cycle = BillingCycle::Billing { day_of_month: 15 };
        let period = cycle_period(cycle, date(2025, 6, 14));
        assert_eq!(period.start, date(2025, 5, 15));
        assert_eq!(period.end, date(2025, 6, 14));
    }

    #[test]
    fn test_billing_anchor_clamped_to_valid_day() {
        let period = cycle_period(BillingCycle::Billing { day_of_month: 0 }, date(2025, 6, 20));
        assert_eq!(period.start, date(2025, 6, 1));
        let period = cycle_period(BillingCycle::Billing { day_of_month: 45 }, date(2025, 6, 20));
        assert_eq!(period.start, date(2025, 5, 31));
        assert_eq!(period.end, date(2025, 6, 29));
    }

    #[test]
    fn test_billing_anchor_reclamps_after_short_month() {
        let cycle = BillingCycle::Billing { day_of_month: 31 };
        let period = cycle_period(cycle, date(2024, 2, 29));
        assert_eq!(period.start, date(2024, 2, 29));
        assert_eq!(period.end, date(2024, 3, 30));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let period = cycle_period(BillingCycle::Calendar, date(2025, 11, 14));
        assert!(period.contains(date(2025, 11, 1)));
        assert!(period.contains(date(2025, 11, 30)));
        assert!(!period.contains(date(2025, 10, 31)));
        assert!(!period.contains(date(2025, 12, 1)));
    }

    #[test]
    fn test_recent_periods_contiguous_and_ordered() {
        let card = card_with_cycle(BillingCycle::Billing { day_of_month: 10 });
        let periods = recent_periods(&card, date(2025, 11, 14), 3);
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[2].start, date(2025, 11, 10));
        for pair in periods.windows(2) {
            let next_day = pair[0].end.succ_opt().unwrap();
            assert_eq!(pair[1].start, next_day);
        }
    }

    #[test]
    fn test_recent_periods_calendar() {
        let card = card_with_cycle(BillingCycle::Calendar);
        let periods = recent_periods(&card, date(2025, 1, 20), 2);
        assert_eq!(periods[0].label, "2024-12");
        assert_eq!(periods[1].label, "2025-01");
    }
}
