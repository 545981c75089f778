//! Async access to resident storage.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::resident::{NewResident, Resident};

use super::{Repository, StorageStatus};

/// Storage operations the HTTP adapters depend on.
///
/// Implementations must keep "no such row" (`None` / `false`) separate from
/// failures (`Err`).
#[async_trait]
pub trait ResidentStore: Send + Sync + std::fmt::Debug {
    /// Every stored resident.
    async fn list(&self) -> Result<Vec<Resident>>;

    /// The resident with `id`, if any.
    async fn get(&self, id: i64) -> Result<Option<Resident>>;

    /// Persist a new resident, returning its id.
    async fn insert(&self, resident: NewResident) -> Result<i64>;

    /// Replace the resident with `id`; `false` if there is none.
    async fn update(&self, id: i64, resident: NewResident) -> Result<bool>;

    /// Remove the resident with `id`; `false` if there is none.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Connectivity and schema check.
    async fn ping(&self) -> Result<StorageStatus>;
}

impl Repository {
    /// Run a blocking repository call off the async runtime.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T> + Send + 'static,
    {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || op(&repo))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl ResidentStore for Repository {
    async fn list(&self) -> Result<Vec<Resident>> {
        self.blocking(Repository::list).await
    }

    async fn get(&self, id: i64) -> Result<Option<Resident>> {
        self.blocking(move |repo| repo.get(id)).await
    }

    async fn insert(&self, resident: NewResident) -> Result<i64> {
        self.blocking(move |repo| repo.insert(&resident)).await
    }

    async fn update(&self, id: i64, resident: NewResident) -> Result<bool> {
        self.blocking(move |repo| repo.update(id, &resident)).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.blocking(move |repo| repo.delete(id)).await
    }

    async fn ping(&self) -> Result<StorageStatus> {
        self.blocking(Repository::ping).await
    }
}
