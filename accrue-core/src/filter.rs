//! Transaction filtering for a card's account and calculation period.
//!
//! Only spend (negative-amount) transactions on the card's ledger account
//! participate in reward calculations; inflows such as payments and
//! refunds posted as credits never do.

use chrono::NaiveDate;

use crate::period::CalculationPeriod;
use crate::transaction::{MILLIUNITS_PER_DOLLAR, Transaction};

/// Whether `txn` is spend on the given ledger account.
pub fn is_account_spend(txn: &Transaction, account_id: &str) -> bool {
    txn.account_id == account_id && txn.is_spend()
}

/// Whether `txn` falls inside the inclusive date range.
pub fn in_range(txn: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    txn.date >= start && txn.date <= end
}

/// Spend transactions on `account_id` dated inside `period`, in input
/// order. Borrows; nothing is copied.
pub fn spend_in_period<'a>(
    transactions: &'a [Transaction],
    account_id: &'a str,
    period: &'a CalculationPeriod,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |t| is_account_spend(t, account_id) && period.contains(t.date))
}

/// Total spend in dollars. Sums in integer milliunits first so repeated
/// cent amounts do not accumulate float error.
pub fn total_spend<'a, I>(transactions: I) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let milliunits: i64 = transactions.into_iter().map(|t| t.spend_milliunits()).sum();
    milliunits as f64 / MILLIUNITS_PER_DOLLAR
}
