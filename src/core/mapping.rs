//! Mapping registry - source to destination routing rules owned by a user.
//!
//! Every mutation is scoped by owner. Asking to change someone else's mapping looks exactly
//! like asking to change one that does not exist.

use crate::{
    core::platform::ChatId,
    entities::{Mapping, mapping},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a new, active mapping and returns it.
pub async fn create_mapping<C>(
    db: &C,
    owner_id: i64,
    source: &ChatId,
    target: &ChatId,
) -> Result<mapping::Model>
where
    C: ConnectionTrait,
{
    if source == target {
        return Err(Error::InvalidChatId {
            value: target.to_string(),
        });
    }

    let model = mapping::ActiveModel {
        owner_id: Set(owner_id),
        source_chat: Set(source.as_str().to_string()),
        target_chat: Set(target.as_str().to_string()),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        mapping_id = created.id,
        owner_id,
        source = %source,
        target = %target,
        "Mapping created"
    );
    Ok(created)
}

/// Lists an owner's mappings, most recently created first.
pub async fn list_mappings<C>(db: &C, owner_id: i64) -> Result<Vec<mapping::Model>>
where
    C: ConnectionTrait,
{
    Mapping::find()
        .filter(mapping::Column::OwnerId.eq(owner_id))
        .order_by_desc(mapping::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Pauses or resumes a mapping. Returns false when no mapping with that id belongs to the owner.
pub async fn set_active<C>(db: &C, owner_id: i64, mapping_id: i64, active: bool) -> Result<bool>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Mapping::update_many()
        .col_expr(mapping::Column::Active, Expr::value(active))
        .filter(mapping::Column::Id.eq(mapping_id))
        .filter(mapping::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Deletes a mapping. Returns false when no mapping with that id belongs to the owner.
pub async fn delete_mapping<C>(db: &C, owner_id: i64, mapping_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Mapping::delete_many()
        .filter(mapping::Column::Id.eq(mapping_id))
        .filter(mapping::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(mapping_id, owner_id, "Mapping deleted");
    }
    Ok(result.rows_affected > 0)
}

/// All active mappings reading from `source`, across every owner.
pub async fn resolve_active_by_source<C>(db: &C, source: &ChatId) -> Result<Vec<mapping::Model>>
where
    C: ConnectionTrait,
{
    Mapping::find()
        .filter(mapping::Column::SourceChat.eq(source.as_str()))
        .filter(mapping::Column::Active.eq(true))
        .order_by_asc(mapping::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of active mappings an owner has.
pub async fn count_active_for_owner<C>(db: &C, owner_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Mapping::find()
        .filter(mapping::Column::OwnerId.eq(owner_id))
        .filter(mapping::Column::Active.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_mapping_rejects_self_loop() -> Result<()> {
        let db = setup_test_db().await?;
        let chat = chat("-100");

        let result = create_mapping(&db, 1, &chat, &chat).await;
        assert!(matches!(result, Err(Error::InvalidChatId { value: _ })));
        assert!(list_mappings(&db, 1).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_mapping_integration() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;

        let created = create_test_mapping(&db, 1, "-100", "-200").await?;
        assert!(created.active);
        assert_eq!(created.owner_id, 1);
        assert_eq!(created.source_chat, "-100");
        assert_eq!(created.target_chat, "-200");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_owner_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        create_test_user(&db, 2).await?;

        let first = create_test_mapping(&db, 1, "-100", "-200").await?;
        let second = create_test_mapping(&db, 1, "-100", "-300").await?;
        create_test_mapping(&db, 2, "-100", "-400").await?;

        let listed = list_mappings(&db, 1).await?;
        let ids: Vec<i64> = listed.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(list_mappings(&db, 3).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_active_by_owner() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        let m = create_test_mapping(&db, 1, "-100", "-200").await?;

        assert!(set_active(&db, 1, m.id, false).await?);
        assert!(resolve_active_by_source(&db, &chat("-100")).await?.is_empty());
        assert_eq!(count_active_for_owner(&db, 1).await?, 0);

        assert!(set_active(&db, 1, m.id, true).await?);
        assert_eq!(resolve_active_by_source(&db, &chat("-100")).await?.len(), 1);
        assert_eq!(count_active_for_owner(&db, 1).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_owner_cannot_toggle_or_delete() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        create_test_user(&db, 2).await?;
        let m = create_test_mapping(&db, 1, "-100", "-200").await?;

        assert!(!set_active(&db, 2, m.id, false).await?);
        assert!(!delete_mapping(&db, 2, m.id).await?);

        let stored = Mapping::find_by_id(m.id).one(&db).await?.unwrap();
        assert_eq!(stored, m);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_id_looks_like_foreign_id() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;

        assert!(!set_active(&db, 1, 12345, true).await?);
        assert!(!delete_mapping(&db, 1, 12345).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_by_owner() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        let m = create_test_mapping(&db, 1, "-100", "-200").await?;

        assert!(delete_mapping(&db, 1, m.id).await?);
        assert!(Mapping::find_by_id(m.id).one(&db).await?.is_none());
        assert!(!delete_mapping(&db, 1, m.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_spans_owners_and_skips_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        create_test_user(&db, 2).await?;

        let a = create_test_mapping(&db, 1, "-100", "-200").await?;
        let b = create_test_mapping(&db, 2, "-100", "-300").await?;
        let paused = create_test_mapping(&db, 2, "-100", "-400").await?;
        create_test_mapping(&db, 1, "-999", "-200").await?;
        set_active(&db, 2, paused.id, false).await?;

        let resolved = resolve_active_by_source(&db, &chat("-100")).await?;
        let ids: Vec<i64> = resolved.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        assert!(resolve_active_by_source(&db, &chat("-555")).await?.is_empty());
        Ok(())
    }
}
