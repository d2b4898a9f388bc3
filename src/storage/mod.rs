use crate::config::{Config, StoreKind};
use crate::models::Paste;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

/// Paste persistence. Every operation is a single atomic statement.
pub trait Storage {
    /// Insert a paste stamped with the current time.
    async fn create_paste(&self, content: &str) -> crate::ApiResult<Paste>;

    /// Get a paste by id, `None` when no such paste exists.
    async fn get_paste(&self, id: i64) -> crate::ApiResult<Option<Paste>>;

    /// Replace the content of a paste, returning the stored paste.
    ///
    /// Fails with [`ApiError::NotFound`](crate::ApiError::NotFound) when no
    /// paste matches.
    async fn update_paste(&self, id: i64, content: &str) -> crate::ApiResult<Paste>;

    /// Delete a paste by id.
    ///
    /// Fails with [`ApiError::NotFound`](crate::ApiError::NotFound) when no
    /// paste matches.
    async fn delete_paste(&self, id: i64) -> crate::ApiResult<()>;

    /// Get all pastes, most recent first.
    async fn list_pastes(&self) -> crate::ApiResult<Vec<Paste>>;
}

#[derive(Clone)]
pub enum AnyStorage {
    Postgres(PostgresStorage),
    Memory(MemoryStorage),
}

impl AnyStorage {
    /// Build the store selected by the config.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(match config.store {
            StoreKind::Postgres => {
                let pool = crate::db::connect(config).await?;
                PostgresStorage::new(pool).into()
            }
            StoreKind::Memory => MemoryStorage::default().into(),
        })
    }

    /// Release whatever the store holds on to.
    pub async fn close(&self) {
        match self {
            AnyStorage::Postgres(postgres) => crate::db::close(postgres.pool()).await,
            AnyStorage::Memory(_) => {}
        }
    }
}

impl Storage for AnyStorage {
    async fn create_paste(&self, content: &str) -> crate::ApiResult<Paste> {
        match self {
            AnyStorage::Postgres(postgres) => postgres.create_paste(content).await,
            AnyStorage::Memory(memory) => memory.create_paste(content).await,
        }
    }

    async fn get_paste(&self, id: i64) -> crate::ApiResult<Option<Paste>> {
        match self {
            AnyStorage::Postgres(postgres) => postgres.get_paste(id).await,
            AnyStorage::Memory(memory) => memory.get_paste(id).await,
        }
    }

    async fn update_paste(&self, id: i64, content: &str) -> crate::ApiResult<Paste> {
        match self {
            AnyStorage::Postgres(postgres) => postgres.update_paste(id, content).await,
            AnyStorage::Memory(memory) => memory.update_paste(id, content).await,
        }
    }

    async fn delete_paste(&self, id: i64) -> crate::ApiResult<()> {
        match self {
            AnyStorage::Postgres(postgres) => postgres.delete_paste(id).await,
            AnyStorage::Memory(memory) => memory.delete_paste(id).await,
        }
    }

    async fn list_pastes(&self) -> crate::ApiResult<Vec<Paste>> {
        match self {
            AnyStorage::Postgres(postgres) => postgres.list_pastes().await,
            AnyStorage::Memory(memory) => memory.list_pastes().await,
        }
    }
}

impl From<PostgresStorage> for AnyStorage {
    fn from(value: PostgresStorage) -> Self {
        AnyStorage::Postgres(value)
    }
}

impl From<MemoryStorage> for AnyStorage {
    fn from(value: MemoryStorage) -> Self {
        AnyStorage::Memory(value)
    }
}
