//! Per-module inclusion rules.
//!
//! Rules run AFTER normalization and decide whether an adapted item enters
//! the canonical sequence. They live in a lookup table registered at
//! configuration time, so the adapter itself carries no per-module
//! branching.

use std::collections::HashMap;
use std::sync::Arc;

use fxb_fields::ModuleId;
use fxb_normalize::NA_TEXT;

use crate::CanonicalItem;

/// Predicate deciding whether a normalized item is kept.
pub type InclusionRule = Arc<dyn Fn(&CanonicalItem) -> bool + Send + Sync>;

/// Lookup table from module id to its inclusion rule, with a default rule
/// for modules nobody registered.
#[derive(Clone)]
pub struct RuleSet {
    rules: HashMap<ModuleId, InclusionRule>,
    default_rule: InclusionRule,
}

impl RuleSet {
    /// Rule set with only the default rule (requester and date present).
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            default_rule: Arc::new(|item| item.requester != NA_TEXT && item.date != NA_TEXT),
        }
    }

    /// The production rules:
    /// - reimbursement and vendor-registration require a real requester;
    /// - trip requires a real date;
    /// - invoice requires a strictly positive value.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.register(ModuleId::Reimbursement, Arc::new(has_requester));
        set.register(ModuleId::VendorRegistration, Arc::new(has_requester));
        set.register(ModuleId::Trip, Arc::new(has_date));
        set.register(ModuleId::Invoice, Arc::new(|item| item.value > 0.0));
        set
    }

    /// Registers or replaces the rule for one module.
    pub fn register(&mut self, module: ModuleId, rule: InclusionRule) {
        self.rules.insert(module, rule);
    }

    pub fn rule_for(&self, module: &ModuleId) -> &InclusionRule {
        self.rules.get(module).unwrap_or(&self.default_rule)
    }

    pub fn admits(&self, module: &ModuleId, item: &CanonicalItem) -> bool {
        let rule = self.rule_for(module);
        rule.as_ref()(item)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modules: Vec<&ModuleId> = self.rules.keys().collect();
        modules.sort_by_key(|m| m.as_str().to_string());
        f.debug_struct("RuleSet").field("modules", &modules).finish()
    }
}

fn has_requester(item: &CanonicalItem) -> bool {
    item.requester != NA_TEXT
        && !item.requester.eq_ignore_ascii_case("null")
        && !item.requester.trim().is_empty()
}

fn has_date(item: &CanonicalItem) -> bool {
    !item.date.is_empty() && item.date != NA_TEXT && !item.date.eq_ignore_ascii_case("null")
}
