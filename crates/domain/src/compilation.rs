use std::fmt;
use std::sync::Arc;

/// Why a rule list was (re)published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationReason {
    InitialLoad,
    NewTds,
    WhitelistUpdated {
        added: Vec<String>,
        removed: Vec<String>,
    },
}

impl CompilationReason {
    pub fn is_whitelist_update(&self) -> bool {
        matches!(self, CompilationReason::WhitelistUpdated { .. })
    }

    /// A page loaded from `host` must be reloaded for the new rules to apply
    /// when its protection status just changed.
    pub fn requires_reload(&self, host: &str) -> bool {
        match self {
            CompilationReason::WhitelistUpdated { added, removed } => {
                added.iter().chain(removed).any(|d| d.eq_ignore_ascii_case(host))
            }
            _ => false,
        }
    }
}

impl fmt::Display for CompilationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilationReason::InitialLoad => f.write_str("initial_load"),
            CompilationReason::NewTds => f.write_str("new_tds"),
            CompilationReason::WhitelistUpdated { added, removed } => write!(
                f,
                "whitelist_updated(added={:?}, removed={:?})",
                added, removed
            ),
        }
    }
}

/// Handle to a rule list compiled and registered by a rule store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRuleList {
    identifier: Arc<str>,
    rule_count: usize,
    encoded_rules: Arc<str>,
}

impl CompiledRuleList {
    pub fn new(identifier: &str, rule_count: usize, encoded_rules: Arc<str>) -> Self {
        Self {
            identifier: Arc::from(identifier),
            rule_count,
            encoded_rules,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn encoded_rules(&self) -> &str {
        &self.encoded_rules
    }
}

/// Value held by the rule list state stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleListStateUpdate {
    pub rule_list: CompiledRuleList,
    pub reason: CompilationReason,
}
