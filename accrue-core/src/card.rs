//! Credit card reward configuration.
//!
//! A card carries a reward program (cashback or miles), optional spend
//! thresholds, a billing cycle definition, and optionally a set of
//! subcategory bands keyed by transaction flag color.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::Settings;

/// How a card earns rewards.
///
/// Cashback rates are percentages (2.0 = 2%); miles rates are units per
/// dollar of eligible spend. A non-finite or non-positive rate earns zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reward_type", rename_all = "snake_case")]
pub enum RewardProgram {
    Cashback {
        #[serde(default)]
        rate_percent: f64,
    },
    Miles {
        #[serde(default)]
        rate_per_dollar: f64,
    },
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 { rate } else { 0.0 }
}

impl RewardProgram {
    pub fn is_miles(&self) -> bool {
        matches!(self, RewardProgram::Miles { .. })
    }

    /// Unit of the raw reward amount ("USD" for cashback, "miles" otherwise).
    pub fn unit_name(&self) -> &'static str {
        match self {
            RewardProgram::Cashback { .. } => "USD",
            RewardProgram::Miles { .. } => "miles",
        }
    }

    /// Raw reward units earned on `eligible_spend` at the card-level rate.
    pub fn reward_units(&self, eligible_spend: f64) -> f64 {
        match self {
            RewardProgram::Cashback { rate_percent } => {
                eligible_spend * sanitize_rate(*rate_percent) / 100.0
            }
            RewardProgram::Miles { rate_per_dollar } => {
                eligible_spend * sanitize_rate(*rate_per_dollar)
            }
        }
    }

    /// Raw reward units for a subcategory band, whose `reward_value`
    /// overrides the card-level rate but keeps the program's unit.
    pub fn band_reward_units(&self, eligible_spend: f64, reward_value: f64) -> f64 {
        match self {
            RewardProgram::Cashback { .. } => eligible_spend * sanitize_rate(reward_value) / 100.0,
            RewardProgram::Miles { .. } => eligible_spend * sanitize_rate(reward_value),
        }
    }

    /// Normalizes raw reward units to dollars using the current settings.
    pub fn to_dollars(&self, units: f64, settings: &Settings) -> f64 {
        match self {
            RewardProgram::Cashback { .. } => units,
            RewardProgram::Miles { .. } => settings.miles_to_dollars(units),
        }
    }
}

/// Which period scheme the card's statements follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BillingCycle {
    /// Calendar months: the 1st through the last day of each month.
    Calendar,
    /// Statement cycles anchored to a day of the month.
    ///
    /// The anchor is clamped into 1..=31, then to the length of the month
    /// it falls in (day 31 in February becomes the 28th/29th).
    Billing { day_of_month: u32 },
}

impl Default for BillingCycle {
    fn default() -> Self {
        BillingCycle::Calendar
    }
}

/// A spend threshold that distinguishes "not configured" from an explicit
/// zero. Only a positive amount constrains anything: a zero minimum is
/// "explicitly no minimum" and a zero maximum is "explicitly unlimited".
/// Non-finite or negative configured values are treated as unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum SpendThreshold {
    #[default]
    Unset,
    ExplicitZero,
    Dollars(f64),
}

impl From<Option<f64>> for SpendThreshold {
    fn from(value: Option<f64>) -> Self {
        match value {
            None => SpendThreshold::Unset,
            Some(v) if !v.is_finite() || v < 0.0 => SpendThreshold::Unset,
            Some(v) if v == 0.0 => SpendThreshold::ExplicitZero,
            Some(v) => SpendThreshold::Dollars(v),
        }
    }
}

impl From<SpendThreshold> for Option<f64> {
    fn from(value: SpendThreshold) -> Self {
        value.configured_amount()
    }
}

impl SpendThreshold {
    /// The stored dollar amount, if any. An explicit zero is `Some(0.0)`.
    pub fn configured_amount(&self) -> Option<f64> {
        match self {
            SpendThreshold::Unset => None,
            SpendThreshold::ExplicitZero => Some(0.0),
            SpendThreshold::Dollars(v) => Some(*v),
        }
    }

    /// The amount that actually constrains a calculation. Unset and
    /// explicit-zero thresholds constrain nothing.
    pub fn active_amount(&self) -> Option<f64> {
        match self {
            SpendThreshold::Dollars(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, SpendThreshold::Unset)
    }

    /// Whether `total_spend` satisfies this as a minimum.
    pub fn is_met_by(&self, total_spend: f64) -> bool {
        match self.active_amount() {
            None => true,
            Some(minimum) => total_spend >= minimum,
        }
    }
}

/// A flag-keyed earning band within a card.
///
/// Bands with equal priority keep their declaration order. A band with no
/// flag is the card's fallback and receives every unmatched transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSubcategory {
    pub id: String,
    pub name: String,
    /// Flag color this band matches (case-insensitive); `None` = fallback.
    #[serde(default)]
    pub flag: Option<String>,
    /// Band earning rate, in the card program's units (percent or per-dollar).
    #[serde(default)]
    pub reward_value: f64,
    #[serde(default)]
    pub minimum_spend: SpendThreshold,
    #[serde(default)]
    pub maximum_spend: SpendThreshold,
    /// Earning block size for miles bands; ignored on cashback cards.
    #[serde(default)]
    pub miles_block_size: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Spend matching this band earns nothing and consumes no shared cap.
    #[serde(default)]
    pub exclude_from_rewards: bool,
    /// Lower priority values claim shared card cap first.
    #[serde(default)]
    pub priority: i32,
}

fn default_true() -> bool {
    true
}

impl CardSubcategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>, reward_value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            flag: None,
            reward_value,
            minimum_spend: SpendThreshold::Unset,
            maximum_spend: SpendThreshold::Unset,
            miles_block_size: None,
            active: true,
            exclude_from_rewards: false,
            priority: 0,
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    pub fn with_minimum_spend(mut self, dollars: f64) -> Self {
        self.minimum_spend = SpendThreshold::from(Some(dollars));
        self
    }

    pub fn with_maximum_spend(mut self, dollars: f64) -> Self {
        self.maximum_spend = SpendThreshold::from(Some(dollars));
        self
    }

    pub fn with_miles_block_size(mut self, block: f64) -> Self {
        self.miles_block_size = Some(block);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn excluded(mut self) -> Self {
        self.exclude_from_rewards = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this band's flag matches a transaction flag, ignoring ASCII
    /// case. A fallback band (no flag) matches only flagless transactions.
    pub fn matches_flag(&self, txn_flag: Option<&str>) -> bool {
        match (&self.flag, txn_flag) {
            (None, None) => true,
            (Some(band), Some(txn)) => band.eq_ignore_ascii_case(txn),
            _ => false,
        }
    }
}

/// A configured credit card tracked by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    /// Ledger account whose transactions belong to this card.
    pub account_id: String,
    #[serde(flatten)]
    pub program: RewardProgram,
    /// Card-level earning block size; spend is floored to a multiple of
    /// this before rewards apply. Ignored when subcategories are enabled.
    #[serde(default)]
    pub earning_block_size: Option<f64>,
    #[serde(default)]
    pub minimum_spend: SpendThreshold,
    #[serde(default)]
    pub maximum_spend: SpendThreshold,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[serde(default)]
    pub subcategories_enabled: bool,
    #[serde(default)]
    pub subcategories: Vec<CardSubcategory>,
}

impl CreditCard {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        account_id: impl Into<String>,
        program: RewardProgram,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issuer: None,
            account_id: account_id.into(),
            program,
            earning_block_size: None,
            minimum_spend: SpendThreshold::Unset,
            maximum_spend: SpendThreshold::Unset,
            billing_cycle: BillingCycle::Calendar,
            subcategories_enabled: false,
            subcategories: Vec::new(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_earning_block_size(mut self, block: f64) -> Self {
        self.earning_block_size = Some(block);
        self
    }

    pub fn with_minimum_spend(mut self, dollars: f64) -> Self {
        self.minimum_spend = SpendThreshold::from(Some(dollars));
        self
    }

    pub fn with_maximum_spend(mut self, dollars: f64) -> Self {
        self.maximum_spend = SpendThreshold::from(Some(dollars));
        self
    }

    pub fn with_billing_cycle(mut self, cycle: BillingCycle) -> Self {
        self.billing_cycle = cycle;
        self
    }

    pub fn with_subcategories(mut self, bands: Vec<CardSubcategory>) -> Self {
        self.subcategories_enabled = true;
        self.subcategories = bands;
        self
    }

    /// Active bands in allocation order: ascending priority, declaration
    /// order on ties.
    pub fn active_subcategories(&self) -> Vec<&CardSubcategory> {
        let mut bands: Vec<&CardSubcategory> =
            self.subcategories.iter().filter(|s| s.active).collect();
        bands.sort_by_key(|s| s.priority);
        bands
    }

    /// The active fallback band (no flag), if one exists.
    pub fn fallback_subcategory(&self) -> Option<&CardSubcategory> {
        self.active_subcategories()
            .into_iter()
            .find(|s| s.flag.is_none())
    }

    /// Whether band-level calculation applies to this card.
    pub fn has_active_subcategories(&self) -> bool {
        self.subcategories_enabled && self.subcategories.iter().any(|s| s.active)
    }

    /// Card-level block size after sanitization (`None` when disabled).
    pub fn effective_block_size(&self) -> Option<f64> {
        normalize_block(self.earning_block_size)
    }

    /// Checks the subcategory setup for configuration mistakes. Only
    /// active bands are considered; an empty result means the setup is
    /// unambiguous.
    pub fn validate(&self) -> Vec<CardConfigIssue> {
        let mut issues = Vec::new();
        if !self.has_active_subcategories() {
            return issues;
        }
        let active = self.active_subcategories();

        let mut seen: Vec<String> = Vec::new();
        for band in &active {
            if let Some(flag) = &band.flag {
                let lower = flag.to_ascii_lowercase();
                if seen.contains(&lower) {
                    if !issues
                        .iter()
                        .any(|i| matches!(i, CardConfigIssue::DuplicateFlag(f) if *f == lower))
                    {
                        issues.push(CardConfigIssue::DuplicateFlag(lower));
                    }
                } else {
                    seen.push(lower);
                }
            }
        }

        let fallbacks = active.iter().filter(|s| s.flag.is_none()).count();
        match fallbacks {
            0 => issues.push(CardConfigIssue::MissingFallback),
            1 => {}
            _ => issues.push(CardConfigIssue::MultipleFallbacks),
        }
        issues
    }
}

/// A subcategory configuration problem surfaced by [`CreditCard::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardConfigIssue {
    /// Two active bands claim the same flag color.
    DuplicateFlag(String),
    /// No active fallback band; unflagged and unmatched spend earns nothing.
    MissingFallback,
    /// More than one active fallback band; only the highest-priority one
    /// receives unmatched spend.
    MultipleFallbacks,
}

impl fmt::Display for CardConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardConfigIssue::DuplicateFlag(flag) => {
                write!(f, "multiple active subcategories match flag '{}'", flag)
            }
            CardConfigIssue::MissingFallback => {
                write!(f, "no fallback subcategory; unmatched spend earns nothing")
            }
            CardConfigIssue::MultipleFallbacks => {
                write!(f, "multiple fallback subcategories configured")
            }
        }
    }
}

/// Sanitizes a block size: only finite, positive values survive.
pub(crate) fn normalize_block(size: Option<f64>) -> Option<f64> {
    size.filter(|b| b.is_finite() && *b > 0.0)
}
