//! Request-scoped caller identity and ownership rules.

use crate::error::{DomainError, DomainResult};
use crate::query::{OwnerScope, UserId};
use crate::user::UserRole;

/// Who is calling. An anonymous caller has no id, so it can never match an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated { id: UserId, role: UserRole },
}

/// Explicit per-request context passed to every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    principal: Principal,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
        }
    }

    pub fn authenticated(id: UserId, role: UserRole) -> Self {
        Self {
            principal: Principal::Authenticated { id, role },
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn caller_id(&self) -> Option<UserId> {
        match self.principal {
            Principal::Authenticated { id, .. } => Some(id),
            Principal::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.principal,
            Principal::Authenticated {
                role: UserRole::Admin,
                ..
            }
        )
    }

    /// The caller's id, or `Unauthorized`.
    pub fn require_authenticated(&self) -> DomainResult<UserId> {
        self.caller_id().ok_or(DomainError::Unauthorized)
    }

    pub fn require_admin(&self) -> DomainResult<()> {
        self.require_authenticated()?;
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Rows the caller may list: everything for administrators, own rows otherwise.
    pub fn list_scope(&self) -> DomainResult<OwnerScope> {
        let id = self.require_authenticated()?;
        if self.is_admin() {
            Ok(OwnerScope::Unrestricted)
        } else {
            Ok(OwnerScope::Owner(id))
        }
    }

    /// Mutations on owned rows: the owner or an administrator.
    pub fn authorize_owner(&self, owner_id: UserId) -> DomainResult<()> {
        let id = self.require_authenticated()?;
        if id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_scope_is_unrestricted() {
        let ctx = RequestContext::authenticated(1, UserRole::Admin);
        assert_eq!(ctx.list_scope(), Ok(OwnerScope::Unrestricted));
        assert!(ctx.authorize_owner(42).is_ok());
    }

    #[test]
    fn test_user_scope_is_own_rows() {
        let ctx = RequestContext::authenticated(7, UserRole::User);
        assert_eq!(ctx.list_scope(), Ok(OwnerScope::Owner(7)));
        assert!(ctx.authorize_owner(7).is_ok());
        assert_eq!(ctx.authorize_owner(8), Err(DomainError::Forbidden));
        assert_eq!(ctx.require_admin(), Err(DomainError::Forbidden));
    }

    #[test]
    fn test_anonymous_matches_nothing() {
        let ctx = RequestContext::anonymous();
        assert_eq!(ctx.caller_id(), None);
        assert_eq!(ctx.list_scope(), Err(DomainError::Unauthorized));
        for owner in [0, 1, -1, i32::MAX] {
            assert_eq!(ctx.authorize_owner(owner), Err(DomainError::Unauthorized));
        }
        assert_eq!(ctx.require_admin(), Err(DomainError::Unauthorized));
    }
}
