//! SQLite profile store implementation.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use entities::{ProfileFields, UserProfile};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use crate::{ProfileFilter, ProfileStore, ProfileStoreError, ProfileStoreResult, USER_PROFILE_ENTITY};

// `name` and `location` are reserved in several stores, so wire field names
// only appear inside the JSON record, never as columns.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user_profiles (
    user_id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    record TEXT NOT NULL
)
"#;

/// How long a write waits for another writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Profile store backed by a single SQLite table.
///
/// Every write is a single statement, so overlapping writers queue on the
/// database lock instead of failing a lock upgrade mid-transaction.
#[derive(Debug, Clone)]
pub struct SqliteProfileStore {
    pool: Pool<Sqlite>,
}

impl SqliteProfileStore {
    /// Connects to the database, creating the file and table if needed.
    pub async fn connect(database_url: &str) -> ProfileStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        // Every connection to an in-memory database gets its own copy, so the
        // single connection must never be reaped.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.run_migrations().await?;

        tracing::info!(database_url = %database_url, "SQLite profile store ready");

        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn run_migrations(&self) -> ProfileStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_profiles_email ON user_profiles (email)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn decode_record(row: &sqlx::sqlite::SqliteRow) -> ProfileStoreResult<UserProfile> {
    let record: String = row.try_get("record")?;
    Ok(serde_json::from_str(&record)?)
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn put_profile(&self, profile: UserProfile) -> ProfileStoreResult<bool> {
        let record = serde_json::to_string(&profile)?;

        // Only feeds the overwrite report; the upsert below does not depend on it.
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles WHERE user_id = ?")
            .bind(&profile.user_id)
            .fetch_one(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO user_profiles (user_id, email, record) VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET email = excluded.email, record = excluded.record",
        )
        .bind(&profile.user_id)
        .bind(&profile.email)
        .bind(record)
        .execute(&self.pool)
        .await?;

        Ok(existing > 0)
    }

    async fn get_profile(&self, user_id: &str) -> ProfileStoreResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT record FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_record).transpose()
    }

    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> ProfileStoreResult<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT record FROM user_profiles WHERE email = ? ORDER BY user_id LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_record).transpose()
    }

    async fn list_profiles(&self, filter: ProfileFilter) -> ProfileStoreResult<Vec<UserProfile>> {
        // A negative LIMIT means no limit in SQLite.
        let limit = filter.limit.map_or(-1, i64::from);
        let offset = filter.offset.map_or(0, i64::from);

        let rows = sqlx::query("SELECT record FROM user_profiles ORDER BY user_id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(decode_record).collect()
    }

    async fn replace_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> ProfileStoreResult<()> {
        // The stored createdAt is carried over inside the statement; the one
        // serialized here only stands in for records that lack it.
        let mut profile = UserProfile::new(user_id);
        profile.replace_fields(fields);
        let record = serde_json::to_string(&profile)?;

        let result = sqlx::query(
            "UPDATE user_profiles SET email = ?1, \
             record = json_set(?2, '$.createdAt', \
                 COALESCE(json_extract(record, '$.createdAt'), json_extract(?2, '$.createdAt'))) \
             WHERE user_id = ?3",
        )
        .bind(&profile.email)
        .bind(record)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ProfileStoreError::not_found(USER_PROFILE_ENTITY, user_id));
        }

        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> ProfileStoreResult<()> {
        sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use entities::{JoinedEvent, Preferences};

    use super::*;

    async fn store() -> SqliteProfileStore {
        SqliteProfileStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_put_get_resolve() {
        let store = store().await;
        let profile = UserProfile::new("u1").with_name("Alice").with_email("a@b.com");

        assert!(!store.put_profile(profile.clone()).await.unwrap());
        assert!(store.put_profile(profile.clone()).await.unwrap());

        let by_id = store.resolve_profile("u1").await.unwrap().unwrap();
        let by_email = store.resolve_profile("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_id, profile);
        assert_eq!(by_email, profile);
    }

    #[tokio::test]
    async fn test_sqlite_replace_keeps_created_at_and_reindexes_email() {
        let store = store().await;
        let mut profile = UserProfile::new("u1").with_email("old@b.com");
        profile.joined_events.push(JoinedEvent::new("e1", "Gig"));
        store.put_profile(profile.clone()).await.unwrap();

        store
            .replace_profile(
                "u1",
                ProfileFields {
                    email: "new@b.com".to_string(),
                    preferences: Preferences::new().with_genres(["jazz"]),
                    ..ProfileFields::default()
                },
            )
            .await
            .unwrap();

        let updated = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(updated.created_at, profile.created_at);
        assert!(updated.joined_events.is_empty());
        assert_eq!(updated.preferences.genres(), ["jazz".to_string()]);

        assert!(store.find_profile_by_email("old@b.com").await.unwrap().is_none());
        assert!(store.find_profile_by_email("new@b.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sqlite_replace_missing_and_delete() {
        let store = store().await;

        let err = store
            .replace_profile("ghost", ProfileFields::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        store.delete_profile("ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_legacy_record_backfill() {
        let store = store().await;
        sqlx::query("INSERT INTO user_profiles (user_id, email, record) VALUES (?, ?, ?)")
            .bind("legacy")
            .bind("l@b.com")
            .bind(r#"{"userID":"legacy","name":"L","email":"l@b.com","createdAt":"2024-01-01T00:00:00Z"}"#)
            .execute(store.pool())
            .await
            .unwrap();

        let profile = store.get_profile("legacy").await.unwrap().unwrap();
        assert!(profile.joined_events.is_empty());
        assert!(profile.preferences.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_list_pagination() {
        let store = store().await;
        for id in ["b", "c", "a"] {
            store.put_profile(UserProfile::new(id)).await.unwrap();
        }

        let all = store.list_profiles(ProfileFilter::new()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].user_id, "a");

        let page = store
            .list_profiles(ProfileFilter::new().with_limit(2).with_offset(1))
            .await
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[tokio::test]
    async fn test_sqlite_memory_pool_keeps_its_connection() {
        let store = store().await;
        let options = store.pool().options();

        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[tokio::test]
    async fn test_sqlite_overlapping_writes_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("profiles.db").display());
        let store = SqliteProfileStore::connect(&url).await.unwrap();
        let original = UserProfile::new("u1").with_email("u1@b.com");
        store.put_profile(original.clone()).await.unwrap();

        for round in 0..20 {
            let writers: Vec<_> = (0..5)
                .map(|writer| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        let name = format!("round {round} writer {writer}");
                        if writer % 2 == 0 {
                            store
                                .replace_profile(
                                    "u1",
                                    ProfileFields {
                                        name,
                                        email: "u1@b.com".to_string(),
                                        ..ProfileFields::default()
                                    },
                                )
                                .await
                        } else {
                            store
                                .put_profile(UserProfile::new(format!("w{writer}")).with_name(name))
                                .await
                                .map(|_| ())
                        }
                    })
                })
                .collect();

            for writer in writers {
                writer.await.unwrap().unwrap();
            }
        }

        let stored = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.name.starts_with("round 19"));
    }
}
