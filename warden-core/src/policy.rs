//! Pure lockout decisions.
//!
//! [`LockoutPolicy`] never touches storage. Each evaluation takes the current
//! [`AttemptRecord`] (if any) plus `now`, and returns what to report together with
//! the [`RecordAction`] that must be applied to the store. Services run
//! evaluate-then-apply under a per-identifier lock; callers who want a strict
//! read/write split can apply the action themselves.

use chrono::{DateTime, Utc};

use crate::{
    clock::deadline_after,
    config::LockoutConfig,
    storage::{AttemptRecord, FailureOutcome, LockoutStatus},
};

/// What to do with the stored attempt record after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAction {
    /// Leave the store untouched
    Keep,
    /// Replace the whole record
    Put(AttemptRecord),
    /// Remove the record
    Delete,
}

/// Outcome of a status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDecision {
    pub status: LockoutStatus,
    pub action: RecordAction,
}

/// Outcome of recording a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDecision {
    pub outcome: FailureOutcome,
    pub action: RecordAction,
}

#[derive(Debug, Clone, Default)]
pub struct LockoutPolicy {
    config: LockoutConfig,
}

impl LockoutPolicy {
    pub fn new(config: LockoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Decide whether authentication may proceed for `identifier` at `now`.
    ///
    /// A lock that has run out is reported as unlocked and the decision asks for
    /// the record to be deleted, so counting restarts from zero.
    pub fn evaluate_status(
        &self,
        identifier: &str,
        record: Option<&AttemptRecord>,
        now: DateTime<Utc>,
    ) -> StatusDecision {
        let max = self.config.max_failed_attempts;

        if !self.config.enabled {
            return StatusDecision {
                status: LockoutStatus::unlocked(identifier, max),
                action: RecordAction::Keep,
            };
        }

        let Some(record) = record else {
            return StatusDecision {
                status: LockoutStatus::unlocked(identifier, max),
                action: RecordAction::Keep,
            };
        };

        match record.locked_until {
            Some(until) if now < until => StatusDecision {
                status: LockoutStatus {
                    identifier: identifier.to_string(),
                    failed_attempts: record.attempt_count,
                    remaining_attempts: 0,
                    is_locked: true,
                    locked_until: Some(until),
                    remaining_minutes: remaining_minutes(until, now),
                },
                action: RecordAction::Keep,
            },
            Some(_) => StatusDecision {
                status: LockoutStatus::unlocked(identifier, max),
                action: RecordAction::Delete,
            },
            None => StatusDecision {
                status: LockoutStatus {
                    identifier: identifier.to_string(),
                    failed_attempts: record.attempt_count,
                    remaining_attempts: max.saturating_sub(record.attempt_count),
                    is_locked: false,
                    locked_until: None,
                    remaining_minutes: 0,
                },
                action: RecordAction::Keep,
            },
        }
    }

    /// Count one failed attempt for `identifier` at `now`.
    ///
    /// A record whose lock has already run out is treated as absent. A failure while
    /// still locked keeps counting and pushes the lock out to `now + lockout_duration`.
    pub fn evaluate_failure(
        &self,
        identifier: &str,
        record: Option<AttemptRecord>,
        now: DateTime<Utc>,
    ) -> FailureDecision {
        let max = self.config.max_failed_attempts;

        if !self.config.enabled {
            return FailureDecision {
                outcome: FailureOutcome {
                    identifier: identifier.to_string(),
                    is_locked: false,
                    attempts: 0,
                    remaining_attempts: max,
                    locked_until: None,
                },
                action: RecordAction::Keep,
            };
        }

        let mut record = match record {
            Some(record) if !record.lock_expired_at(now) => record,
            _ => AttemptRecord::new(identifier),
        };

        record.attempt_count = record.attempt_count.saturating_add(1);

        let outcome = if record.attempt_count >= max {
            let until = deadline_after(now, self.config.lockout_duration);
            record.locked_until = Some(until);
            FailureOutcome {
                identifier: identifier.to_string(),
                is_locked: true,
                attempts: record.attempt_count,
                remaining_attempts: 0,
                locked_until: Some(until),
            }
        } else {
            record.locked_until = None;
            FailureOutcome {
                identifier: identifier.to_string(),
                is_locked: false,
                attempts: record.attempt_count,
                remaining_attempts: max - record.attempt_count,
                locked_until: None,
            }
        };

        FailureDecision {
            outcome,
            action: RecordAction::Put(record),
        }
    }
}

/// Minutes left until `until`, rounded up.
fn remaining_minutes(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + 59_999) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn put_record(action: RecordAction) -> AttemptRecord {
        match action {
            RecordAction::Put(record) => record,
            other => panic!("Expected put action, got {other:?}"),
        }
    }

    #[test]
    fn test_status_without_record_is_unlocked() {
        let policy = LockoutPolicy::default();
        let decision = policy.evaluate_status("a@b.com", None, t0());

        assert!(!decision.status.is_locked);
        assert_eq!(decision.status.remaining_attempts, 5);
        assert_eq!(decision.action, RecordAction::Keep);
    }

    #[test]
    fn test_failures_count_up_then_lock() {
        let policy = LockoutPolicy::default();
        let mut record = None;

        for expected in 1..=4u32 {
            let decision = policy.evaluate_failure("a@b.com", record.take(), t0());
            assert!(!decision.outcome.is_locked);
            assert_eq!(decision.outcome.attempts, expected);
            assert_eq!(decision.outcome.remaining_attempts, 5 - expected);
            record = Some(put_record(decision.action));
        }

        let decision = policy.evaluate_failure("a@b.com", record.take(), t0());
        assert!(decision.outcome.is_locked);
        assert_eq!(decision.outcome.attempts, 5);
        assert_eq!(decision.outcome.remaining_attempts, 0);
        assert_eq!(
            decision.outcome.locked_until,
            Some(t0() + Duration::minutes(15))
        );
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let policy = LockoutPolicy::default();
        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 5,
            locked_until: Some(t0() + Duration::minutes(15)),
        };

        let decision = policy.evaluate_status("a@b.com", Some(&record), t0());
        assert!(decision.status.is_locked);
        assert_eq!(decision.status.remaining_minutes, 15);

        let later = t0() + Duration::seconds(61);
        let decision = policy.evaluate_status("a@b.com", Some(&record), later);
        assert_eq!(decision.status.remaining_minutes, 14);

        let almost = t0() + Duration::minutes(15) - Duration::seconds(1);
        let decision = policy.evaluate_status("a@b.com", Some(&record), almost);
        assert_eq!(decision.status.remaining_minutes, 1);
    }

    #[test]
    fn test_expired_lock_requests_delete() {
        let policy = LockoutPolicy::default();
        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 5,
            locked_until: Some(t0()),
        };

        let decision = policy.evaluate_status("a@b.com", Some(&record), t0());
        assert!(!decision.status.is_locked);
        assert_eq!(decision.status.failed_attempts, 0);
        assert_eq!(decision.action, RecordAction::Delete);
    }

    #[test]
    fn test_failure_after_expired_lock_restarts_count() {
        let policy = LockoutPolicy::default();
        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 5,
            locked_until: Some(t0()),
        };

        let decision =
            policy.evaluate_failure("a@b.com", Some(record), t0() + Duration::minutes(1));
        assert!(!decision.outcome.is_locked);
        assert_eq!(decision.outcome.attempts, 1);
        assert_eq!(put_record(decision.action).locked_until, None);
    }

    #[test]
    fn test_failure_while_locked_extends_lock() {
        let policy = LockoutPolicy::default();
        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 5,
            locked_until: Some(t0() + Duration::minutes(15)),
        };

        let now = t0() + Duration::minutes(5);
        let decision = policy.evaluate_failure("a@b.com", Some(record), now);
        assert!(decision.outcome.is_locked);
        assert_eq!(decision.outcome.attempts, 6);
        assert_eq!(
            decision.outcome.locked_until,
            Some(now + Duration::minutes(15))
        );
    }

    #[test]
    fn test_unlocked_record_never_carries_lock() {
        let policy = LockoutPolicy::new(LockoutConfig::default().max_failed_attempts(3));
        let mut record = None;
        for _ in 0..2 {
            let decision = policy.evaluate_failure("a@b.com", record.take(), t0());
            let stored = put_record(decision.action);
            assert!(stored.attempt_count < 3);
            assert!(stored.locked_until.is_none());
            record = Some(stored);
        }
    }

    #[test]
    fn test_disabled_policy_keeps_store_untouched() {
        let policy = LockoutPolicy::new(LockoutConfig::disabled());

        let decision = policy.evaluate_failure("a@b.com", None, t0());
        assert!(!decision.outcome.is_locked);
        assert_eq!(decision.outcome.attempts, 0);
        assert_eq!(decision.action, RecordAction::Keep);

        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 9,
            locked_until: Some(t0() + Duration::minutes(15)),
        };
        let decision = policy.evaluate_status("a@b.com", Some(&record), t0());
        assert!(!decision.status.is_locked);
        assert_eq!(decision.action, RecordAction::Keep);
    }

    #[test]
    fn test_lock_deadline_is_whole_milliseconds() {
        let policy = LockoutPolicy::new(LockoutConfig::default().max_failed_attempts(1));
        let now = DateTime::from_timestamp(1_700_000_000, 987_654_321).unwrap();

        let decision = policy.evaluate_failure("a@b.com", None, now);
        assert_eq!(
            decision.outcome.locked_until,
            Some(DateTime::from_timestamp(1_700_000_900, 987_000_000).unwrap())
        );
    }

    #[test]
    fn test_oversized_lockout_duration_does_not_overflow() {
        let policy = LockoutPolicy::new(
            LockoutConfig::default()
                .max_failed_attempts(1)
                .lockout_duration(Duration::MAX),
        );

        let decision = policy.evaluate_failure("a@b.com", None, t0());
        assert!(decision.outcome.is_locked);
        assert_eq!(
            decision.outcome.locked_until,
            Some(DateTime::<Utc>::MAX_UTC.trunc_subsecs(3))
        );
    }
}
