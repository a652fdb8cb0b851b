//! Binding scopes: which ruleset and layout variant a mapping belongs to

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BindingError;

/// Durable identity of a ruleset, assigned once it has been persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesetId(pub i64);

impl fmt::Display for RulesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ruleset (game mode) that supplies its own default bindings
///
/// `id` is `None` until the ruleset has been persisted. Without it the store
/// has no way to associate overrides with the ruleset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RulesetInfo {
    pub id: Option<RulesetId>,
    pub short_name: String,
}

impl RulesetInfo {
    /// A ruleset with a durable identity
    pub fn new(id: RulesetId, short_name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            short_name: short_name.into(),
        }
    }

    /// A ruleset that only exists in memory
    pub fn transient(short_name: impl Into<String>) -> Self {
        Self {
            id: None,
            short_name: short_name.into(),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.id.is_some()
    }
}

/// The binding context being resolved
///
/// `ruleset == None` is the global context. A ruleset scope always carries
/// a variant; see [`Scope::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub ruleset: Option<RulesetInfo>,
    pub variant: Option<i32>,
}

impl Scope {
    /// The global input context
    pub fn global() -> Self {
        Self::default()
    }

    /// A ruleset context for one layout variant
    pub fn ruleset(ruleset: RulesetInfo, variant: i32) -> Self {
        Self {
            ruleset: Some(ruleset),
            variant: Some(variant),
        }
    }

    /// Build a scope from optional parts, rejecting a ruleset without variant
    pub fn new(ruleset: Option<RulesetInfo>, variant: Option<i32>) -> Result<Self, BindingError> {
        let scope = Self { ruleset, variant };
        scope.validate()?;
        Ok(scope)
    }

    pub fn validate(&self) -> Result<(), BindingError> {
        match (&self.ruleset, self.variant) {
            (Some(ruleset), None) => Err(BindingError::InvalidScope {
                ruleset: ruleset.short_name.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn is_global(&self) -> bool {
        self.ruleset.is_none()
    }

    /// The store key for this scope, or `None` if the ruleset has no durable id
    ///
    /// The outer `Option` distinguishes "cannot be looked up" from the global
    /// scope, whose ruleset id is itself `None`.
    pub fn store_key(&self) -> Option<(Option<RulesetId>, Option<i32>)> {
        match &self.ruleset {
            None => Some((None, self.variant)),
            Some(RulesetInfo { id: Some(id), .. }) => Some((Some(*id), self.variant)),
            Some(RulesetInfo { id: None, .. }) => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ruleset, self.variant) {
            (None, None) => write!(f, "global"),
            (None, Some(v)) => write!(f, "global/{}", v),
            (Some(r), Some(v)) => write!(f, "{}/{}", r.short_name, v),
            (Some(r), None) => write!(f, "{}", r.short_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_without_variant_is_invalid() {
        let result = Scope::new(Some(RulesetInfo::new(RulesetId(1), "taiko")), None);
        assert!(matches!(result, Err(BindingError::InvalidScope { .. })));
    }

    #[test]
    fn test_global_scope_is_valid() {
        assert!(Scope::new(None, None).is_ok());
        assert!(Scope::global().is_global());
    }

    #[test]
    fn test_store_key() {
        assert_eq!(Scope::global().store_key(), Some((None, None)));

        let durable = Scope::ruleset(RulesetInfo::new(RulesetId(3), "mania"), 4);
        assert_eq!(durable.store_key(), Some((Some(RulesetId(3)), Some(4))));

        let transient = Scope::ruleset(RulesetInfo::transient("custom"), 0);
        assert_eq!(transient.store_key(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scope::global().to_string(), "global");
        let scope = Scope::ruleset(RulesetInfo::new(RulesetId(3), "mania"), 4);
        assert_eq!(scope.to_string(), "mania/4");
    }
}
