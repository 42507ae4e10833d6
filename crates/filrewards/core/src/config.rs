use crate::error::RewardsError;
use crate::types::{EventMapping, FactorTable};

/// Base amount per factor unit shipped with the daemon, in attoFIL.
pub const DEFAULT_BASE_AMOUNT: i64 = 1000;

/// Process-wide reward configuration. Immutable once the service starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardsConfig {
    pub base_amount: i64,
    pub factors: FactorTable,
    pub events: EventMapping,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            base_amount: DEFAULT_BASE_AMOUNT,
            factors: FactorTable::default(),
            events: EventMapping::default(),
        }
    }
}

impl RewardsConfig {
    pub fn with_base_amount(mut self, base_amount: i64) -> Self {
        self.base_amount = base_amount;
        self
    }

    pub fn validate(&self) -> Result<(), RewardsError> {
        if self.base_amount <= 0 {
            return Err(RewardsError::invalid_argument(format!(
                "base amount must be positive, got {}",
                self.base_amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RewardsConfig::default();
        assert_eq!(config.base_amount, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_base_amount() {
        assert!(RewardsConfig::default()
            .with_base_amount(0)
            .validate()
            .unwrap_err()
            .is_invalid_argument());
    }
}
