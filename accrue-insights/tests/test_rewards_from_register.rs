//! End-to-end: parse the register fixture, compute rewards for the fixture
//! cards, and rank them for a category group.

use accrue_core::{CreditCard, Settings, Transaction, calculate_period};
use accrue_ingest::{parse_register_csv, to_transactions};
use accrue_insights::{
    CardStatus, CategoryGroup, GroupMember, calculate_all, calculate_history,
    generate_category_recommendations,
};
use chrono::NaiveDate;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name)
}

fn load_cards() -> Vec<CreditCard> {
    let raw = std::fs::read_to_string(fixture_path("cards.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn load_transactions() -> Vec<Transaction> {
    let rows = parse_register_csv(fixture_path("register.csv")).expect("should parse register.csv");
    to_transactions(&rows)
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
}

#[test]
fn test_register_fixture_parses() {
    let rows = parse_register_csv(fixture_path("register.csv")).unwrap();
    assert_eq!(rows.len(), 10);
    assert!(rows.iter().any(|r| r.account == "Checking"));
    // Flags come out lowercased.
    let cafe = rows.iter().find(|r| r.payee == "Corner Cafe").unwrap();
    assert_eq!(cafe.flag.as_deref(), Some("red"));
    assert_eq!(cafe.amount_milliunits, -80_250);
}

#[test]
fn test_cards_fixture_validates() {
    let cards = load_cards();
    assert_eq!(cards.len(), 2);
    for card in &cards {
        assert!(card.validate().is_empty(), "config issues on {}", card.id);
    }
    assert!(cards[1].has_active_subcategories());
}

#[test]
fn test_cashback_card_caps_at_maximum() {
    let cards = load_cards();
    let transactions = load_transactions();
    let calcs = calculate_all(&cards, &transactions, reference(), &Settings::default());

    let freedom = &calcs[0];
    assert_eq!(freedom.card_id, "card-freedom");
    assert_eq!(freedom.period.label, "2025-11");
    assert_eq!(freedom.period.start, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    assert_eq!(freedom.period.end, NaiveDate::from_ymd_opt(2025, 11, 30).unwrap());
    // 640 + 480 spend; the 500 payment inflow and October row do not count.
    assert_eq!(freedom.total_spend, 1120.0);
    assert_eq!(freedom.eligible_spend_before_blocks, 1000.0);
    assert_eq!(freedom.eligible_spend, 1000.0);
    assert_eq!(freedom.reward_earned, 20.0);
    assert_eq!(freedom.reward_earned_dollars, 20.0);
    assert!(freedom.minimum_met);
    assert!(freedom.maximum_spend_exceeded);
}

#[test]
fn test_miles_card_band_breakdown() {
    let cards = load_cards();
    let transactions = load_transactions();
    let calcs = calculate_all(&cards, &transactions, reference(), &Settings::default());

    let sapphire = &calcs[1];
    assert_eq!(sapphire.card_id, "card-sapphire");
    // Billing day 15: Nov 15 through Dec 14, so the Nov 14 dinner is out.
    assert_eq!(sapphire.period.start, NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
    assert_eq!(sapphire.period.end, NaiveDate::from_ymd_opt(2025, 12, 14).unwrap());
    assert_eq!(sapphire.total_spend, 407.0);

    let rows = &sapphire.subcategories;
    assert_eq!(rows.len(), 3);

    let dining = &rows[0];
    assert_eq!(dining.subcategory_id, "sub-dining");
    assert_eq!(dining.spend, 120.0);
    assert_eq!(dining.eligible_spend, 120.0);
    assert_eq!(dining.reward_earned, 360.0);

    // 230 spend capped by the band maximum of 200, already a multiple of 25.
    let grocery = &rows[1];
    assert_eq!(grocery.subcategory_id, "sub-grocery");
    assert_eq!(grocery.spend, 230.0);
    assert_eq!(grocery.eligible_spend_before_blocks, 200.0);
    assert_eq!(grocery.eligible_spend, 200.0);
    assert_eq!(grocery.reward_earned, 400.0);

    let other = &rows[2];
    assert_eq!(other.subcategory_id, "sub-other");
    assert_eq!(other.spend, 57.0);
    assert_eq!(other.reward_earned, 57.0);

    assert_eq!(sapphire.eligible_spend_before_blocks, 377.0);
    assert_eq!(sapphire.eligible_spend, 377.0);
    assert_eq!(sapphire.reward_earned, 817.0);
    assert!((sapphire.reward_earned_dollars - 8.17).abs() < 1e-9);
    assert!(!sapphire.maximum_spend_exceeded);
}

#[test]
fn test_food_group_ranking() {
    let cards = load_cards();
    let transactions = load_transactions();
    let calcs = calculate_all(&cards, &transactions, reference(), &Settings::default());

    let groups = vec![CategoryGroup {
        id: "grp-food".to_string(),
        name: "Food".to_string(),
        members: vec![
            GroupMember {
                card_id: "card-freedom".to_string(),
                subcategory_id: None,
            },
            GroupMember {
                card_id: "card-sapphire".to_string(),
                subcategory_id: Some("sub-dining".to_string()),
            },
            GroupMember {
                card_id: "card-sapphire".to_string(),
                subcategory_id: Some("sub-grocery".to_string()),
            },
        ],
    }];

    let recs = generate_category_recommendations(&cards, &calcs, &groups, &Settings::default());
    assert_eq!(recs.len(), 1);
    let insights = &recs[0].insights;
    assert_eq!(insights.len(), 2);

    // 760 miles over $320 eligible beats the capped-out cashback card.
    let sapphire = &insights[0];
    assert_eq!(sapphire.card_id, "card-sapphire");
    assert_eq!(sapphire.status, CardStatus::Use);
    assert_eq!(sapphire.eligible_spend, 320.0);
    assert!((sapphire.reward_rate - 0.02375).abs() < 1e-9);

    let freedom = &insights[1];
    assert_eq!(freedom.card_id, "card-freedom");
    assert_eq!(freedom.status, CardStatus::Avoid);
    assert_eq!(freedom.headroom_to_maximum, Some(0.0));
}

#[test]
fn test_history_spans_previous_periods() {
    let cards = load_cards();
    let transactions = load_transactions();
    let freedom = &cards[0];

    let history = calculate_history(freedom, &transactions, reference(), 2, &Settings::default());
    let labels: Vec<&str> = history.iter().map(|c| c.period.label.as_str()).collect();
    assert_eq!(labels, vec!["2025-10", "2025-11"]);
    assert_eq!(history[0].total_spend, 55.0);
    assert_eq!(history[0].reward_earned, 1.1);
    assert_eq!(history[1].total_spend, 1120.0);

    // Same reference date, same periods.
    let again = calculate_history(freedom, &transactions, reference(), 2, &Settings::default());
    assert_eq!(history, again);
}

#[test]
fn test_period_reference_on_cycle_start() {
    let cards = load_cards();
    let sapphire = &cards[1];
    let period = calculate_period(sapphire, NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
    assert_eq!(period.start, NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
}
