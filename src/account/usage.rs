//! Plan allowances and the gate that enforces them.

use tracing::info;

use crate::error::UsageError;

use super::store::{UsageRecord, UsageStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plan {
    /// Metered: a finite allowance of transcribed seconds.
    Free { allowance_secs: f64 },
    /// Unmetered.
    Pro,
}

/// Checks a requested amount of processing time against the plan and records
/// consumption after a successful run.
pub struct UsageGate {
    plan: Plan,
    store: Box<dyn UsageStore>,
}

impl UsageGate {
    pub fn new(plan: Plan, store: Box<dyn UsageStore>) -> Self {
        Self { plan, store }
    }

    /// Reject the run up front if it would exceed the plan allowance.
    pub fn check(&self, requested_secs: f64) -> Result<(), UsageError> {
        match self.plan {
            Plan::Pro => Ok(()),
            Plan::Free { allowance_secs } => {
                let used = self.store.load()?.seconds_transcribed;
                let remaining = (allowance_secs - used).max(0.0);
                if requested_secs > remaining {
                    return Err(UsageError::LimitExceeded {
                        requested: requested_secs,
                        remaining,
                    });
                }
                Ok(())
            }
        }
    }

    /// Persist consumed seconds after a run completed.
    pub fn record(&self, secs: f64) -> Result<(), UsageError> {
        let mut record = self.store.load()?;
        record.seconds_transcribed += secs;
        self.store.save(&record)?;
        info!(
            consumed_secs = secs,
            total_secs = record.seconds_transcribed,
            "usage recorded"
        );
        Ok(())
    }

    pub fn used_secs(&self) -> Result<f64, UsageError> {
        Ok(self.store.load()?.seconds_transcribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::store::MemoryStore;

    fn free_gate(allowance: f64) -> UsageGate {
        UsageGate::new(
            Plan::Free {
                allowance_secs: allowance,
            },
            Box::new(MemoryStore::new()),
        )
    }

    #[test]
    fn free_plan_allows_within_allowance() {
        let gate = free_gate(600.0);
        assert!(gate.check(599.0).is_ok());
    }

    #[test]
    fn free_plan_rejects_over_allowance() {
        let gate = free_gate(600.0);
        gate.record(500.0).unwrap();

        let err = gate.check(200.0).unwrap_err();
        match err {
            UsageError::LimitExceeded {
                requested,
                remaining,
            } => {
                assert_eq!(requested, 200.0);
                assert_eq!(remaining, 100.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pro_plan_is_unmetered() {
        let gate = UsageGate::new(Plan::Pro, Box::new(MemoryStore::new()));
        gate.record(1_000_000.0).unwrap();
        assert!(gate.check(f64::MAX).is_ok());
    }

    #[test]
    fn recording_accumulates() {
        let gate = free_gate(1_000.0);
        gate.record(100.0).unwrap();
        gate.record(50.5).unwrap();
        assert_eq!(gate.used_secs().unwrap(), 150.5);
    }
}
