//! Ledger transaction records consumed by the reward engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Milliunits per major currency unit in the upstream ledger format.
pub const MILLIUNITS_PER_DOLLAR: f64 = 1000.0;

/// A read-only transaction from the external ledger.
///
/// Amounts are signed integers in milliunits of the ledger currency;
/// negative = outflow. The engine only ever treats negative amounts as spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ledger account the transaction posted to.
    pub account_id: String,
    /// Signed amount in milliunits (divide by 1000 for dollars).
    pub amount_milliunits: i64,
    /// Local calendar date (YYYY-MM-DD); no time-of-day, no timezone.
    pub date: NaiveDate,
    /// Upstream flag/tag color, used to key subcategory bands.
    pub flag: Option<String>,
}

impl Transaction {
    pub fn new(account_id: impl Into<String>, amount_milliunits: i64, date: NaiveDate) -> Self {
        Self {
            account_id: account_id.into(),
            amount_milliunits,
            date,
            flag: None,
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Returns true if this is spend (negative amount).
    pub fn is_spend(&self) -> bool {
        self.amount_milliunits < 0
    }

    /// Absolute spend in milliunits; zero for inflows.
    pub fn spend_milliunits(&self) -> i64 {
        if self.is_spend() {
            -self.amount_milliunits
        } else {
            0
        }
    }

    /// Absolute spend in major units; zero for inflows.
    pub fn spend_dollars(&self) -> f64 {
        self.spend_milliunits() as f64 / MILLIUNITS_PER_DOLLAR
    }
}
