use chrono::Utc;
use sqlx::PgPool;

use super::Storage;
use crate::models::Paste;
use crate::ApiError;

#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        PostgresStorage { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Storage for PostgresStorage {
    async fn create_paste(&self, content: &str) -> crate::ApiResult<Paste> {
        let paste = sqlx::query_as::<_, Paste>(
            "INSERT INTO pastes (content, created_at) VALUES ($1, $2) RETURNING id, content, \
             created_at",
        )
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(paste)
    }

    async fn get_paste(&self, id: i64) -> crate::ApiResult<Option<Paste>> {
        let paste =
            sqlx::query_as::<_, Paste>("SELECT id, content, created_at FROM pastes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(paste)
    }

    async fn update_paste(&self, id: i64, content: &str) -> crate::ApiResult<Paste> {
        sqlx::query_as::<_, Paste>(
            "UPDATE pastes SET content = $1 WHERE id = $2 RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound)
    }

    async fn delete_paste(&self, id: i64) -> crate::ApiResult<()> {
        let result = sqlx::query("DELETE FROM pastes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn list_pastes(&self) -> crate::ApiResult<Vec<Paste>> {
        Ok(sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at FROM pastes ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
