//! Key/value repository for database operations.

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::kv_entry;

/// Repository for key/value entries.
pub struct KvRepository;

impl KvRepository {
    /// Get the raw value stored under a key.
    pub async fn get<C>(conn: &C, key: &str) -> Result<Option<String>>
    where
        C: ConnectionTrait,
    {
        Ok(kv_entry::Entity::find_by_id(key.to_string())
            .one(conn)
            .await?
            .map(|entry| entry.value))
    }

    /// Insert or replace the value stored under a key.
    pub async fn set<C>(conn: &C, key: &str, value: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let entry = kv_entry::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(chrono::Utc::now().to_rfc3339()),
        };

        kv_entry::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(kv_entry::Column::Key)
                    .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Remove a key. Removing a missing key is not an error.
    pub async fn remove<C>(conn: &C, key: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        kv_entry::Entity::delete_many()
            .filter(kv_entry::Column::Key.eq(key))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// List all stored keys.
    pub async fn keys<C>(conn: &C) -> Result<Vec<String>>
    where
        C: ConnectionTrait,
    {
        Ok(kv_entry::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }
}
