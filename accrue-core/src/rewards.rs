//! The reward calculator.
//!
//! Pure computation: card configuration, ledger transactions, and a period
//! go in; a [`RewardCalculation`] comes out. No I/O and no runtime failure
//! for well-typed input; malformed numeric configuration degrades to "not
//! configured" instead of erroring.

use serde::{Deserialize, Serialize};

use crate::card::{CardSubcategory, CreditCard, RewardProgram, normalize_block};
use crate::filter::spend_in_period;
use crate::period::CalculationPeriod;
use crate::settings::Settings;
use crate::transaction::{MILLIUNITS_PER_DOLLAR, Transaction};

/// Per-band figures attached to a banded calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryCalculation {
    pub subcategory_id: String,
    pub name: String,
    /// Spend resolved to this band. Excluded bands report zero here; their
    /// spend counts toward nothing.
    pub spend: f64,
    pub eligible_spend_before_blocks: f64,
    pub eligible_spend: f64,
    /// Raw units in the card program's currency (dollars or miles).
    pub reward_earned: f64,
    pub reward_earned_dollars: f64,
    /// Whether the band's own minimum was met. The card-level minimum is
    /// reported on the parent calculation.
    pub minimum_met: bool,
    pub excluded: bool,
}

/// The calculator's output for one card over one period.
///
/// `reward_earned` is in raw program units (dollars for cashback, miles
/// otherwise); `reward_earned_dollars` is normalized at the settings in
/// force when the calculation ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCalculation {
    pub card_id: String,
    pub period: CalculationPeriod,
    /// Spend that counts: all account spend in the period, minus spend
    /// resolved to excluded bands when subcategories are active.
    pub total_spend: f64,
    pub eligible_spend_before_blocks: f64,
    pub eligible_spend: f64,
    pub reward_earned: f64,
    pub reward_earned_dollars: f64,
    pub minimum_met: bool,
    /// True once period spend has reached a configured positive cap.
    pub maximum_spend_exceeded: bool,
    /// Per-band breakdown; empty when the card has no active subcategories.
    pub subcategories: Vec<SubcategoryCalculation>,
    /// One-line recap for logs and change review.
    pub summary: String,
}

/// Calculates a card's rewards over `period`.
///
/// Algorithm (deterministic):
/// 1) Filter to spend on the card's account dated inside the period.
/// 2) With active subcategories, resolve each transaction to a band and
///    run the shared-cap allocation; otherwise run the whole-card path.
/// 3) Gate on the card minimum (all-or-nothing), apply the cap, block
///    rounding, and the rate, then normalize to dollars at the current
///    settings.
pub fn calculate_card_rewards(
    card: &CreditCard,
    transactions: &[Transaction],
    period: &CalculationPeriod,
    settings: &Settings,
) -> RewardCalculation {
    let spend: Vec<&Transaction> =
        spend_in_period(transactions, &card.account_id, period).collect();
    if card.has_active_subcategories() {
        calculate_banded(card, &spend, period, settings)
    } else {
        calculate_whole_card(card, &spend, period, settings)
    }
}

fn calculate_whole_card(
    card: &CreditCard,
    spend: &[&Transaction],
    period: &CalculationPeriod,
    settings: &Settings,
) -> RewardCalculation {
    let total_milli: i64 = spend.iter().map(|t| t.spend_milliunits()).sum();
    let total_spend = total_milli as f64 / MILLIUNITS_PER_DOLLAR;

    let minimum_met = card.minimum_spend.is_met_by(total_spend);
    let cap = card.maximum_spend.active_amount();

    let eligible_spend_before_blocks = if minimum_met {
        // With no bands, per-transaction capping reduces to a single
        // capped sum over the exact integer-summed total.
        match cap {
            Some(limit) => total_spend.min(limit),
            None => total_spend,
        }
    } else {
        0.0
    };

    let eligible_spend = apply_block(eligible_spend_before_blocks, card.effective_block_size());
    let reward_earned = card.program.reward_units(eligible_spend);
    let reward_earned_dollars = card.program.to_dollars(reward_earned, settings);
    let maximum_spend_exceeded = match cap {
        Some(limit) => total_spend >= limit,
        None => false,
    };

    let mut calc = RewardCalculation {
        card_id: card.id.clone(),
        period: period.clone(),
        total_spend,
        eligible_spend_before_blocks,
        eligible_spend,
        reward_earned,
        reward_earned_dollars,
        minimum_met,
        maximum_spend_exceeded,
        subcategories: Vec::new(),
        summary: String::new(),
    };
    calc.summary = build_summary(card, &calc);
    calc
}

fn calculate_banded(
    card: &CreditCard,
    spend: &[&Transaction],
    period: &CalculationPeriod,
    settings: &Settings,
) -> RewardCalculation {
    let bands = card.active_subcategories();
    let fallback_idx = bands.iter().position(|b| b.flag.is_none());

    // Spend per band, in milliunits, in allocation order. A flagged
    // transaction with no matching band falls back; with no fallback
    // either, it is dropped from every total.
    let mut band_milli = vec![0i64; bands.len()];
    for txn in spend {
        let resolved = match txn.flag.as_deref() {
            Some(flag) => bands
                .iter()
                .position(|b| b.matches_flag(Some(flag)))
                .or(fallback_idx),
            None => fallback_idx,
        };
        if let Some(idx) = resolved {
            band_milli[idx] += txn.spend_milliunits();
        }
    }

    // Spend in excluded bands counts toward nothing, including the
    // card-level minimum.
    let counted_milli: i64 = bands
        .iter()
        .zip(&band_milli)
        .filter(|(band, _)| !band.exclude_from_rewards)
        .map(|(_, milli)| *milli)
        .sum();
    let total_spend = counted_milli as f64 / MILLIUNITS_PER_DOLLAR;

    let minimum_met = card.minimum_spend.is_met_by(total_spend);
    let card_cap = card.maximum_spend.active_amount();

    // Shared-cap allocation: fold over bands in priority order, threading
    // the remaining card-wide cap through each step.
    let initial_cap = card_cap.unwrap_or(f64::INFINITY);
    let (subcategories, _remaining) = bands.iter().zip(&band_milli).fold(
        (Vec::with_capacity(bands.len()), initial_cap),
        |(mut rows, remaining_cap), (band, milli)| {
            let band_spend = *milli as f64 / MILLIUNITS_PER_DOLLAR;
            let (row, rest) = allocate_band(
                band,
                band_spend,
                remaining_cap,
                minimum_met,
                &card.program,
                settings,
            );
            rows.push(row);
            (rows, rest)
        },
    );

    let eligible_spend_before_blocks: f64 = subcategories
        .iter()
        .map(|r| r.eligible_spend_before_blocks)
        .sum();
    let eligible_spend: f64 = subcategories.iter().map(|r| r.eligible_spend).sum();
    let reward_earned: f64 = subcategories.iter().map(|r| r.reward_earned).sum();
    let reward_earned_dollars: f64 = subcategories
        .iter()
        .map(|r| r.reward_earned_dollars)
        .sum();
    let maximum_spend_exceeded = match card_cap {
        Some(limit) => total_spend >= limit || eligible_spend_before_blocks >= limit,
        None => false,
    };

    let mut calc = RewardCalculation {
        card_id: card.id.clone(),
        period: period.clone(),
        total_spend,
        eligible_spend_before_blocks,
        eligible_spend,
        reward_earned,
        reward_earned_dollars,
        minimum_met,
        maximum_spend_exceeded,
        subcategories,
        summary: String::new(),
    };
    calc.summary = build_summary(card, &calc);
    calc
}

/// Allocates one band against the remaining shared card cap, returning the
/// band row and the cap left for lower-priority bands.
///
/// The cap is consumed by the band's pre-block eligible amount, not the
/// rounded earning amount. A band whose own minimum is unmet earns nothing
/// and consumes no cap.
fn allocate_band(
    band: &CardSubcategory,
    band_spend: f64,
    remaining_cap: f64,
    card_minimum_met: bool,
    program: &RewardProgram,
    settings: &Settings,
) -> (SubcategoryCalculation, f64) {
    if band.exclude_from_rewards {
        let row = SubcategoryCalculation {
            subcategory_id: band.id.clone(),
            name: band.name.clone(),
            spend: 0.0,
            eligible_spend_before_blocks: 0.0,
            eligible_spend: 0.0,
            reward_earned: 0.0,
            reward_earned_dollars: 0.0,
            minimum_met: true,
            excluded: true,
        };
        return (row, remaining_cap);
    }

    let band_minimum_met = band.minimum_spend.is_met_by(band_spend);
    if !card_minimum_met || !band_minimum_met {
        let row = SubcategoryCalculation {
            subcategory_id: band.id.clone(),
            name: band.name.clone(),
            spend: band_spend,
            eligible_spend_before_blocks: 0.0,
            eligible_spend: 0.0,
            reward_earned: 0.0,
            reward_earned_dollars: 0.0,
            minimum_met: band_minimum_met,
            excluded: false,
        };
        return (row, remaining_cap);
    }

    let mut eligible_before = band_spend;
    if let Some(limit) = band.maximum_spend.active_amount() {
        eligible_before = eligible_before.min(limit);
    }
    eligible_before = eligible_before.min(remaining_cap);

    // Block rounding is a miles concept; cashback bands earn exact cents.
    let block = if program.is_miles() {
        normalize_block(band.miles_block_size)
    } else {
        None
    };
    let eligible = apply_block(eligible_before, block);
    let reward = program.band_reward_units(eligible, band.reward_value);
    let dollars = program.to_dollars(reward, settings);

    let row = SubcategoryCalculation {
        subcategory_id: band.id.clone(),
        name: band.name.clone(),
        spend: band_spend,
        eligible_spend_before_blocks: eligible_before,
        eligible_spend: eligible,
        reward_earned: reward,
        reward_earned_dollars: dollars,
        minimum_met: true,
        excluded: false,
    };
    (row, remaining_cap - eligible_before)
}

/// Floors `amount` to a whole number of blocks; `None` leaves it unchanged.
fn apply_block(amount: f64, block: Option<f64>) -> f64 {
    match block {
        Some(size) => (amount / size).floor() * size,
        None => amount,
    }
}

fn build_summary(card: &CreditCard, calc: &RewardCalculation) -> String {
    let mut summary = format!(
        "{} {}: spend ${:.2}, eligible ${:.2}, earned {:.2} {} (${:.2})",
        card.name,
        calc.period.label,
        calc.total_spend,
        calc.eligible_spend,
        calc.reward_earned,
        card.program.unit_name(),
        calc.reward_earned_dollars,
    );
    if !calc.minimum_met {
        summary.push_str("; minimum not met");
    }
    if calc.maximum_spend_exceeded {
        summary.push_str("; maximum reached");
    }
    summary
}
