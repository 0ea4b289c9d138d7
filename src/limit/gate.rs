//! Composite policy evaluation across the subjects of one request.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::backend::LimiterBackend;
use super::key::{LimitKey, Subject, SubjectKind};
use super::limiter::RateLimiter;
use super::rules::LimitsConfig;
use super::window::Decision;

/// The combined verdict for one request.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Whether every check allowed the request
    pub allowed: bool,
    /// The most restrictive reset among denied checks
    pub retry_after: Duration,
    /// The individual decision for each subject, in request order
    pub checks: Vec<SubjectCheck>,
}

impl Verdict {
    /// The `Retry-After` value for this verdict, in whole seconds.
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_millis().div_ceil(1000) as u64
    }
}

/// The decision for a single subject within a verdict.
#[derive(Debug, Clone, Copy)]
pub struct SubjectCheck {
    /// The subject kind this decision applies to
    pub kind: SubjectKind,
    /// The limiter's decision
    pub decision: Decision,
}

/// Evaluates every subject of a request against the configured rules.
///
/// Subjects are checked in request order and the request is allowed only if
/// all checks allow it. Checks that ran before a denial keep their consumed
/// budget; a denied check does not consume any.
pub struct Gate<B: LimiterBackend = RateLimiter> {
    /// The limiter backend holding the record store
    backend: Arc<B>,
    /// Per-scope rules
    limits: LimitsConfig,
}

impl<B: LimiterBackend> Gate<B> {
    /// Create a new gate over a limiter backend and rule set.
    pub fn new(backend: Arc<B>, limits: LimitsConfig) -> Self {
        Self { backend, limits }
    }

    /// Evaluate all subjects of a request under the given scope.
    pub async fn evaluate(&self, scope: &str, subjects: &[Subject]) -> Verdict {
        let mut checks = Vec::with_capacity(subjects.len());
        let mut allowed = true;
        let mut retry_after = Duration::ZERO;

        for subject in subjects {
            let rule = self.limits.rule_for(scope, subject.kind);
            let key = LimitKey::new(scope, subject).to_string();

            let decision = self
                .backend
                .check(&key, rule.max_attempts, rule.window.duration())
                .await;

            if !decision.allowed {
                debug!(key = %key, "Check denied");
                allowed = false;
                // Surface the most restrictive reset across denials
                retry_after = retry_after.max(decision.reset_in);
            }

            checks.push(SubjectCheck {
                kind: subject.kind,
                decision,
            });
        }

        Verdict {
            allowed,
            retry_after,
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::clock::ManualClock;
    use crate::limit::rules::{LimitRule, ScopeConfig};
    use crate::limit::window::TimeWindow;

    fn subscribe_limits() -> LimitsConfig {
        let mut limits = LimitsConfig::new();
        limits.scopes.insert(
            "subscribe".to_string(),
            ScopeConfig {
                rules: vec![
                    LimitRule {
                        subject: SubjectKind::Ip,
                        max_attempts: 10,
                        window: TimeWindow::Hour,
                    },
                    LimitRule {
                        subject: SubjectKind::Email,
                        max_attempts: 3,
                        window: TimeWindow::Hour,
                    },
                ],
            },
        );
        limits
    }

    fn request(ip: &str, email: &str) -> Vec<Subject> {
        vec![
            Subject::new(SubjectKind::Ip, ip),
            Subject::new(SubjectKind::Email, email),
        ]
    }

    #[tokio::test]
    async fn test_all_checks_pass() {
        let gate = Gate::new(Arc::new(RateLimiter::new()), subscribe_limits());

        let verdict = gate
            .evaluate("subscribe", &request("1.2.3.4", "a@b.com"))
            .await;

        assert!(verdict.allowed);
        assert_eq!(verdict.retry_after, Duration::ZERO);
        assert_eq!(verdict.checks.len(), 2);
        assert_eq!(verdict.checks[0].decision.remaining, 9);
        assert_eq!(verdict.checks[1].decision.remaining, 2);
    }

    #[tokio::test]
    async fn test_email_budget_denies_despite_ip_budget() {
        let gate = Gate::new(Arc::new(RateLimiter::new()), subscribe_limits());

        // Same IP, three distinct emails: all pass
        for email in ["a@b.com", "c@d.com", "e@f.com"] {
            let verdict = gate.evaluate("subscribe", &request("1.2.3.4", email)).await;
            assert!(verdict.allowed);
        }

        // Burn the remaining budget for one email
        for _ in 0..2 {
            gate.evaluate("subscribe", &request("1.2.3.4", "a@b.com"))
                .await;
        }

        // Fourth use of that email is denied even though the IP allows more
        let verdict = gate
            .evaluate("subscribe", &request("1.2.3.4", "a@b.com"))
            .await;
        assert!(!verdict.allowed);
        assert!(verdict.retry_after > Duration::ZERO);
        assert!(verdict.checks[0].decision.allowed);
        assert!(!verdict.checks[1].decision.allowed);
    }

    #[tokio::test]
    async fn test_earlier_checks_keep_consumed_budget() {
        let gate = Gate::new(Arc::new(RateLimiter::new()), subscribe_limits());

        // Exhaust the email budget
        for _ in 0..4 {
            gate.evaluate("subscribe", &request("1.2.3.4", "a@b.com"))
                .await;
        }

        // The denied requests still consumed IP budget for the checks that ran
        let verdict = gate
            .evaluate("subscribe", &request("1.2.3.4", "g@h.com"))
            .await;
        assert!(verdict.allowed);
        assert_eq!(verdict.checks[0].decision.remaining, 10 - 5);
    }

    #[tokio::test]
    async fn test_retry_after_is_most_restrictive() {
        let mut limits = LimitsConfig::new();
        limits.scopes.insert(
            "confirm".to_string(),
            ScopeConfig {
                rules: vec![
                    LimitRule {
                        subject: SubjectKind::Ip,
                        max_attempts: 1,
                        window: TimeWindow::Minute,
                    },
                    LimitRule {
                        subject: SubjectKind::Token,
                        max_attempts: 1,
                        window: TimeWindow::Hour,
                    },
                ],
            },
        );

        let clock = Arc::new(ManualClock::new());
        let gate = Gate::new(Arc::new(RateLimiter::with_clock(clock)), limits);
        let subjects = vec![
            Subject::new(SubjectKind::Ip, "1.2.3.4"),
            Subject::new(SubjectKind::Token, "tok-1"),
        ];

        assert!(gate.evaluate("confirm", &subjects).await.allowed);

        // Both budgets exhausted; the hour-long window wins
        let verdict = gate.evaluate("confirm", &subjects).await;
        assert!(!verdict.allowed);
        assert_eq!(verdict.retry_after, TimeWindow::Hour.duration());
        assert_eq!(verdict.retry_after_secs(), 3600);
    }

    #[tokio::test]
    async fn test_unconfigured_scope_uses_default_rule() {
        let gate = Gate::new(Arc::new(RateLimiter::new()), LimitsConfig::new());

        let verdict = gate
            .evaluate("track-open", &[Subject::new(SubjectKind::Token, "tok")])
            .await;

        assert!(verdict.allowed);
        assert_eq!(verdict.checks[0].decision.remaining, 9);
    }
}
