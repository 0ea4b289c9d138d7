//! Rate limit rules configuration and lookup.
//!
//! Each scope (one per guarded endpoint, e.g. `subscribe`) carries a list of
//! rules keyed by subject kind. Scopes and kinds without an explicit rule
//! fall back to a default budget.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::key::SubjectKind;
use super::window::TimeWindow;

/// Default attempt budget when no specific rule is configured.
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Default time window when no specific rule is configured.
const DEFAULT_WINDOW: TimeWindow = TimeWindow::Hour;

/// A complete rate limiting configuration containing all scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Interval between full sweeps of expired records, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Map of scope name to scope configuration
    #[serde(default)]
    pub scopes: HashMap<String, ScopeConfig>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            scopes: HashMap::new(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    300
}

/// Configuration for a single scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Rules for this scope, one per subject kind
    #[serde(default)]
    pub rules: Vec<LimitRule>,
}

/// A rate limit rule specifying the budget for one subject kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRule {
    /// The subject kind this rule applies to
    pub subject: SubjectKind,
    /// Maximum attempts allowed in the time window
    pub max_attempts: u32,
    /// The time window
    pub window: TimeWindow,
}

impl LimitRule {
    /// The fallback rule applied when a scope or kind is not configured.
    pub fn default_for(kind: SubjectKind) -> Self {
        Self {
            subject: kind,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: DEFAULT_WINDOW,
        }
    }
}

impl LimitsConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the rule for a subject kind within a scope.
    ///
    /// Unknown scopes and unconfigured kinds get the default rule, so every
    /// check always has a budget to enforce.
    pub fn rule_for(&self, scope: &str, kind: SubjectKind) -> LimitRule {
        self.scopes
            .get(scope)
            .and_then(|s| s.rules.iter().find(|r| r.subject == kind))
            .cloned()
            .unwrap_or_else(|| LimitRule::default_for(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> LimitsConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_scoped_rules() {
        let config = parse(
            r#"
scopes:
  subscribe:
    rules:
      - subject: ip
        max_attempts: 10
        window: hour
      - subject: email
        max_attempts: 3
        window: hour
"#,
        );

        assert!(config.scopes.contains_key("subscribe"));
        assert_eq!(config.scopes["subscribe"].rules.len(), 2);
        assert_eq!(config.sweep_interval_secs, 300);
    }

    #[test]
    fn test_rule_lookup() {
        let config = parse(
            r#"
scopes:
  subscribe:
    rules:
      - subject: email
        max_attempts: 3
        window: hour
"#,
        );

        let rule = config.rule_for("subscribe", SubjectKind::Email);
        assert_eq!(rule.max_attempts, 3);
        assert_eq!(rule.window, TimeWindow::Hour);
    }

    #[test]
    fn test_unknown_scope_gets_default() {
        let config = LimitsConfig::new();
        let rule = config.rule_for("nonexistent", SubjectKind::Ip);
        assert_eq!(rule.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(rule.window, DEFAULT_WINDOW);
    }

    #[test]
    fn test_unconfigured_kind_gets_default() {
        let config = parse(
            r#"
scopes:
  subscribe:
    rules:
      - subject: email
        max_attempts: 3
        window: hour
"#,
        );

        let rule = config.rule_for("subscribe", SubjectKind::Token);
        assert_eq!(rule.subject, SubjectKind::Token);
        assert_eq!(rule.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }
}
