//! Lookup table management. Reads are open to any signed-in user; writes
//! are reserved to administrators, and roles are never written. The open
//! and closed statuses drive the bug status toggle and cannot be deleted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::repository::LookupRepository;
use common::{AppError, AppResult};
use domain::{
    validate_input, Lookup, LookupInput, LookupKind, Normalize, RequestContext, STATUS_CLOSED,
    STATUS_OPEN,
};

#[async_trait]
pub trait LookupService: Send + Sync {
    async fn list_lookups(&self, ctx: RequestContext, kind: LookupKind) -> AppResult<Vec<Lookup>>;

    async fn save_lookup(
        &self,
        ctx: RequestContext,
        kind: LookupKind,
        input: LookupInput,
    ) -> AppResult<Lookup>;

    async fn delete_lookup(&self, ctx: RequestContext, kind: LookupKind, id: i32)
        -> AppResult<()>;
}

pub struct LookupManager {
    lookups: Arc<dyn LookupRepository>,
}

impl LookupManager {
    pub fn new(lookups: Arc<dyn LookupRepository>) -> Self {
        Self { lookups }
    }
}

fn authorize_write(ctx: &RequestContext, kind: LookupKind) -> AppResult<()> {
    ctx.require_admin()?;
    if !kind.is_editable() {
        warn!(table = kind.table(), "Write to read-only lookup refused");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn is_seeded_status(kind: LookupKind, id: i32) -> bool {
    kind == LookupKind::Status && (id == STATUS_OPEN || id == STATUS_CLOSED)
}

#[async_trait]
impl LookupService for LookupManager {
    async fn list_lookups(&self, ctx: RequestContext, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        ctx.require_authenticated()?;
        self.lookups.list(kind).await
    }

    async fn save_lookup(
        &self,
        ctx: RequestContext,
        kind: LookupKind,
        input: LookupInput,
    ) -> AppResult<Lookup> {
        authorize_write(&ctx, kind)?;
        let input = input.normalized();
        validate_input(&input)?;

        self.lookups
            .save(kind, input.id.target(), input.name)
            .await
    }

    async fn delete_lookup(
        &self,
        ctx: RequestContext,
        kind: LookupKind,
        id: i32,
    ) -> AppResult<()> {
        authorize_write(&ctx, kind)?;
        if is_seeded_status(kind, id) {
            warn!(status_id = id, "Delete of a seeded status refused");
            return Err(AppError::Forbidden);
        }
        self.lookups.delete(kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockLookupRepository;
    use domain::{SaveTarget, UserRole};
    use mockall::predicate::eq;

    fn admin() -> RequestContext {
        RequestContext::authenticated(1, UserRole::Admin)
    }

    #[tokio::test]
    async fn test_roles_are_read_only() {
        let mut lookups = MockLookupRepository::new();
        lookups.expect_save().never();

        let service = LookupManager::new(Arc::new(lookups));
        let input = LookupInput {
            name: "ROLE_AUDITOR".into(),
            ..Default::default()
        };
        let result = service.save_lookup(admin(), LookupKind::Role, input).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_users_cannot_edit_lookups() {
        let mut lookups = MockLookupRepository::new();
        lookups.expect_delete().never();

        let service = LookupManager::new(Arc::new(lookups));
        let ctx = RequestContext::authenticated(2, UserRole::User);
        let result = service.delete_lookup(ctx, LookupKind::Priority, 4).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_open_and_closed_statuses_cannot_be_deleted() {
        let mut lookups = MockLookupRepository::new();
        lookups.expect_delete().never();

        let service = LookupManager::new(Arc::new(lookups));
        for id in [STATUS_OPEN, STATUS_CLOSED] {
            let result = service.delete_lookup(admin(), LookupKind::Status, id).await;
            assert!(matches!(result, Err(AppError::Forbidden)), "status {}", id);
        }
    }

    #[tokio::test]
    async fn test_admin_deletes_other_status() {
        let mut lookups = MockLookupRepository::new();
        lookups
            .expect_delete()
            .with(eq(LookupKind::Status), eq(3))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = LookupManager::new(Arc::new(lookups));
        assert!(service
            .delete_lookup(admin(), LookupKind::Status, 3)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_admin_renames_priority() {
        let mut lookups = MockLookupRepository::new();
        lookups
            .expect_save()
            .with(eq(LookupKind::Priority), eq(SaveTarget::Update(4)), eq("minor".to_string()))
            .returning(|_, _, name| Ok(Lookup { id: 4, name }));

        let service = LookupManager::new(Arc::new(lookups));
        let input = LookupInput {
            id: 4.into(),
            name: " minor ".into(),
        };
        let saved = service
            .save_lookup(admin(), LookupKind::Priority, input)
            .await
            .unwrap();
        assert_eq!(saved.name, "minor");
    }
}
