//! accrue-core: Pure reward computation for the Accrue card tracker

pub mod card;
pub mod filter;
pub mod period;
pub mod rewards;
pub mod settings;
pub mod transaction;

pub use card::{
    BillingCycle, CardConfigIssue, CardSubcategory, CreditCard, RewardProgram, SpendThreshold,
};
pub use filter::{in_range, is_account_spend, spend_in_period, total_spend};
pub use period::{CalculationPeriod, calculate_period, cycle_period, recent_periods};
pub use rewards::{RewardCalculation, SubcategoryCalculation, calculate_card_rewards};
pub use settings::{DEFAULT_MILES_VALUATION, Settings};
pub use transaction::{MILLIUNITS_PER_DOLLAR, Transaction};
