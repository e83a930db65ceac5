use accrue_core::Transaction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Clearing state of a register row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cleared {
    Cleared,
    Uncleared,
    Reconciled,
}

impl Cleared {
    /// Parses the register export's cleared column ("Cleared", "C", ...).
    /// Anything unrecognized is treated as uncleared.
    pub fn from_register(value: &str) -> Cleared {
        let value = value.trim();
        if value.eq_ignore_ascii_case("cleared") || value.eq_ignore_ascii_case("c") {
            Cleared::Cleared
        } else if value.eq_ignore_ascii_case("reconciled") || value.eq_ignore_ascii_case("r") {
            Cleared::Reconciled
        } else {
            Cleared::Uncleared
        }
    }
}

/// Normalized output of register ingestion (provider-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRow {
    pub account: String,
    pub date: NaiveDate,
    pub payee: String,
    pub memo: String,
    /// Flag color, lowercased; `None` when the row is unflagged.
    pub flag: Option<String>,
    /// Signed amount in milliunits: inflow minus outflow.
    pub amount_milliunits: i64,
    pub cleared: Cleared,
}

impl RegisterRow {
    /// Converts to the engine's transaction shape.
    pub fn to_transaction(&self) -> Transaction {
        let txn = Transaction::new(self.account.clone(), self.amount_milliunits, self.date);
        match &self.flag {
            Some(flag) => txn.with_flag(flag.clone()),
            None => txn,
        }
    }
}

/// Converts a whole register to engine transactions, in register order.
pub fn to_transactions(rows: &[RegisterRow]) -> Vec<Transaction> {
    rows.iter().map(RegisterRow::to_transaction).collect()
}
