//! Reward pipeline: batch period resolution and calculation across cards.

use accrue_core::{
    CreditCard, RewardCalculation, Settings, Transaction, calculate_card_rewards,
    calculate_period, recent_periods,
};
use chrono::NaiveDate;

/// One calculation per card, each over the period containing `reference`
/// under that card's own billing cycle. Output order follows `cards`.
pub fn calculate_all(
    cards: &[CreditCard],
    transactions: &[Transaction],
    reference: NaiveDate,
    settings: &Settings,
) -> Vec<RewardCalculation> {
    cards
        .iter()
        .map(|card| {
            let period = calculate_period(card, reference);
            calculate_card_rewards(card, transactions, &period, settings)
        })
        .collect()
}

/// Calculations for a card's trailing periods, oldest first; the period
/// containing `reference` comes last.
pub fn calculate_history(
    card: &CreditCard,
    transactions: &[Transaction],
    reference: NaiveDate,
    count: usize,
    settings: &Settings,
) -> Vec<RewardCalculation> {
    recent_periods(card, reference, count)
        .iter()
        .map(|period| calculate_card_rewards(card, transactions, period, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrue_core::{BillingCycle, RewardProgram};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn spend(account: &str, dollars: f64, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(account, -((dollars * 1000.0).round() as i64), date(y, m, d))
    }

    #[test]
    fn test_calculate_all_respects_each_cycle() {
        let cards = vec![
            CreditCard::new(
                "card-cal",
                "Calendar Card",
                "acct-a",
                RewardProgram::Cashback { rate_percent: 2.0 },
            ),
            CreditCard::new(
                "card-bill",
                "Billing Card",
                "acct-b",
                RewardProgram::Cashback { rate_percent: 1.0 },
            )
            .with_billing_cycle(BillingCycle::Billing { day_of_month: 15 }),
        ];
        let transactions = vec![
            spend("acct-a", 100.0, 2025, 11, 3),
            spend("acct-b", 100.0, 2025, 11, 3),
            spend("acct-b", 50.0, 2025, 11, 16),
        ];

        let calcs = calculate_all(&cards, &transactions, date(2025, 11, 20), &Settings::default());
        assert_eq!(calcs.len(), 2);
        assert_eq!(calcs[0].card_id, "card-cal");
        assert_eq!(calcs[0].total_spend, 100.0);
        // The billing card's cycle started Nov 15; the Nov 3 row is outside.
        assert_eq!(calcs[1].total_spend, 50.0);
    }

    #[test]
    fn test_calculate_history_is_oldest_first() {
        let card = CreditCard::new(
            "card-cal",
            "Calendar Card",
            "acct-a",
            RewardProgram::Cashback { rate_percent: 2.0 },
        );
        let transactions = vec![
            spend("acct-a", 200.0, 2025, 9, 10),
            spend("acct-a", 300.0, 2025, 10, 10),
            spend("acct-a", 400.0, 2025, 11, 10),
        ];
        let history =
            calculate_history(&card, &transactions, date(2025, 11, 20), 3, &Settings::default());
        let labels: Vec<&str> = history.iter().map(|c| c.period.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-09", "2025-10", "2025-11"]);
        assert_eq!(history[0].total_spend, 200.0);
        assert_eq!(history[2].reward_earned, 8.0);
    }
}
