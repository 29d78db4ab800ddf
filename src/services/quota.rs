use crate::error::ServiceError;

/// Transcription minutes of the current plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub used: u32,
    pub total: u32,
    /// Minutes charged for each applied transcription.
    pub per_run: u32,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            used: 147,
            total: 500,
            per_run: 5,
        }
    }
}

impl Quota {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.used as f32 / self.total as f32 * 100.0
    }

    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }

    pub fn is_low(&self) -> bool {
        self.percent() > 80.0
    }

    pub fn is_exhausted(&self) -> bool {
        self.percent() >= 100.0
    }

    pub fn suggests_upgrade(&self) -> bool {
        self.percent() > 50.0
    }

    pub fn check(&self) -> Result<(), ServiceError> {
        if self.is_exhausted() {
            return Err(ServiceError::QuotaExhausted {
                used: self.used,
                total: self.total,
            });
        }
        Ok(())
    }

    pub fn record_run(&mut self) {
        self.used = self.used.saturating_add(self.per_run).min(self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let quota = Quota::default();
        assert_eq!(quota.remaining(), 353);
        assert!(!quota.is_low());
        assert!(!quota.suggests_upgrade());
        assert!(quota.check().is_ok());
    }

    #[test]
    fn test_thresholds() {
        let mut quota = Quota {
            used: 396,
            total: 500,
            per_run: 5,
        };
        assert!(quota.suggests_upgrade());
        assert!(!quota.is_low());
        quota.record_run();
        assert!(quota.is_low());
        quota.used = 498;
        quota.record_run();
        assert_eq!(quota.used, 500);
        assert_eq!(
            quota.check(),
            Err(ServiceError::QuotaExhausted { used: 500, total: 500 })
        );
    }
}
