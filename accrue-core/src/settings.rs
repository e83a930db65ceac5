//! Engine-wide settings.

use serde::{Deserialize, Serialize};

/// Default dollar value of one mile/point when the user has not set one.
pub const DEFAULT_MILES_VALUATION: f64 = 0.01;

/// User-tunable settings applied at calculation time.
///
/// Settings are read when a calculation runs; stored results keep raw
/// reward units so a later valuation change re-prices miles without
/// recomputing eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Dollar value assigned to one mile/point for normalization.
    #[serde(default = "default_miles_valuation")]
    pub miles_valuation: f64,
}

fn default_miles_valuation() -> f64 {
    DEFAULT_MILES_VALUATION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            miles_valuation: DEFAULT_MILES_VALUATION,
        }
    }
}

impl Settings {
    /// The valuation actually used: falls back to the default when the
    /// stored value is non-finite or not positive.
    pub fn effective_miles_valuation(&self) -> f64 {
        if self.miles_valuation.is_finite() && self.miles_valuation > 0.0 {
            self.miles_valuation
        } else {
            DEFAULT_MILES_VALUATION
        }
    }

    /// Converts raw miles to dollars at the effective valuation.
    pub fn miles_to_dollars(&self, miles: f64) -> f64 {
        miles * self.effective_miles_valuation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valuation() {
        let settings = Settings::default();
        assert_eq!(settings.effective_miles_valuation(), 0.01);
        assert_eq!(settings.miles_to_dollars(1500.0), 15.0);
    }

    #[test]
    fn test_custom_valuation() {
        let settings = Settings {
            miles_valuation: 0.018,
        };
        assert_eq!(settings.miles_to_dollars(1000.0), 18.0);
    }

    #[test]
    fn test_invalid_valuation_falls_back() {
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let settings = Settings {
                miles_valuation: bad,
            };
            assert_eq!(settings.effective_miles_valuation(), 0.01);
        }
    }

    #[test]
    fn test_missing_field_deserializes_to_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.miles_valuation, 0.01);
    }
}
