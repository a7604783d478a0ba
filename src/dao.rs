use anyhow::Result;
use sqlx::AnyPool;

pub async fn upsert_slot(pool: &AnyPool, key: &str, payload: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO slots(key, payload) VALUES(?, ?)\n         ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, updated_at=CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_slot(pool: &AnyPool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query_scalar::<_, String>("SELECT payload FROM slots WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn delete_slot(pool: &AnyPool, key: &str) -> Result<u64> {
    let res = sqlx::query("DELETE FROM slots WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Delete slots by key prefix, or everything when no prefix is given.
pub async fn clear_slots_prefix(pool: &AnyPool, prefix: Option<&str>) -> Result<u64> {
    let result = if let Some(p) = prefix {
        let like = format!("{}%", p);
        sqlx::query("DELETE FROM slots WHERE key LIKE ?")
            .bind(like)
            .execute(pool)
            .await?
    } else {
        sqlx::query("DELETE FROM slots").execute(pool).await?
    };
    Ok(result.rows_affected())
}

pub async fn count_slots(pool: &AnyPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
