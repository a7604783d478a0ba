use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::any::AnyPoolOptions;
use sqlx::{any::AnyConnectOptions, migrate::Migrator, AnyPool, ConnectOptions};
use std::sync::Once;
use std::{path::PathBuf, str::FromStr};

use crate::dao;
use crate::storage::Storage;

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a sensible default
    // (SQLite file in the user's data directory).
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        // Register compiled-in drivers for sqlx::any
        INSTALL_DRIVERS.call_once(|| sqlx::any::install_default_drivers());

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        // Parse options to tweak connection settings (e.g., logging)
        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        match MIGRATOR.run(&self.pool).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let msg = e.to_string();
                let looks_modified = msg.contains("was previously applied but has been modified");
                let duplicate_version = msg.contains("UNIQUE constraint failed: _sqlx_migrations.version");
                if looks_modified || duplicate_version {
                    let _ = sqlx::query("DELETE FROM _sqlx_migrations").execute(&self.pool).await;
                    MIGRATOR.run(&self.pool).await.context("running migrations after ledger reset")
                } else {
                    Err(e).context("running migrations")
                }
            }
        }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn count_slots(&self) -> Result<i64> {
        dao::count_slots(&self.pool).await
    }

    pub async fn clear_slots_prefix(&self, prefix: Option<&str>) -> Result<u64> {
        dao::clear_slots_prefix(&self.pool, prefix).await
    }

    pub async fn vacuum(&self) -> Result<()> {
        // Best-effort: works on SQLite
        let _ = sqlx::query("VACUUM").execute(&self.pool).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for Database {
    async fn get_slot(&self, key: &str) -> Result<Option<String>> {
        dao::get_slot(&self.pool, key).await
    }

    async fn put_slot(&self, key: &str, payload: &str) -> Result<()> {
        dao::upsert_slot(&self.pool, key, payload).await
    }

    async fn delete_slot(&self, key: &str) -> Result<u64> {
        dao::delete_slot(&self.pool, key).await
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "reeldeck", "reeldeck")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("reeldeck.db");

    // Ensure parent directory exists (double safety)
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating db parent dir: {}", parent.display()))?;
    }

    // Ensure the file exists so SQLite can open it in rw mode
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&path);

    // Encode spaces in the path for a valid sqlite URL
    let mut path_str = path.to_string_lossy().to_string();
    if path_str.contains(' ') {
        path_str = path_str.replace(' ', "%20");
    }
    Ok(format!("sqlite:///{path_str}?mode=rwc"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("deck.db");
        let url = format!("sqlite:///{}?mode=rwc", path.to_string_lossy());
        let db = Database::connect(Some(&url)).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn slot_round_trip_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = temp_db(&dir).await;
            db.put_slot("deck/liked", "[1,2,3]").await.unwrap();
            assert_eq!(db.get_slot("deck/liked").await.unwrap().as_deref(), Some("[1,2,3]"));
        }
        let db = temp_db(&dir).await;
        assert_eq!(db.get_slot("deck/liked").await.unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[tokio::test]
    async fn upsert_replaces_payload() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        db.put_slot("deck/pager", "v1").await.unwrap();
        db.put_slot("deck/pager", "v2").await.unwrap();
        assert_eq!(db.get_slot("deck/pager").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(db.count_slots().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_by_prefix_only_touches_matches() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        db.put_slot("deck/liked", "[]").await.unwrap();
        db.put_slot("deck/watched", "[]").await.unwrap();
        db.put_slot("other", "x").await.unwrap();
        assert_eq!(db.clear_slots_prefix(Some("deck/")).await.unwrap(), 2);
        assert_eq!(db.count_slots().await.unwrap(), 1);
    }
}
