//! Acting-user resolution
//!
//! Services stamp `creator`/`modifier` with the identity returned by an
//! injected [`CurrentUserResolver`].

use crate::domain::{MedrecordError, Result};

/// The user on whose behalf a request runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Source of the current user
pub trait CurrentUserResolver: Send + Sync {
    /// The acting user
    ///
    /// # Errors
    ///
    /// Returns `NotAcceptable` when no user can be resolved.
    fn current_user(&self) -> Result<Identity>;
}

/// Always resolves the same user, e.g. the configured system account
#[derive(Debug, Clone)]
pub struct StaticUserResolver {
    identity: Identity,
}

impl StaticUserResolver {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(user_id),
        }
    }
}

impl CurrentUserResolver for StaticUserResolver {
    fn current_user(&self) -> Result<Identity> {
        if self.identity.user_id.trim().is_empty() {
            return Err(MedrecordError::NotAcceptable(
                "No acting user configured".to_string(),
            ));
        }
        Ok(self.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resolver() {
        let resolver = StaticUserResolver::new("system");
        assert_eq!(resolver.current_user().unwrap().user_id, "system");
    }

    #[test]
    fn test_blank_user_is_rejected() {
        let err = StaticUserResolver::new("  ").current_user().unwrap_err();
        assert!(matches!(err, MedrecordError::NotAcceptable(_)));
    }
}
