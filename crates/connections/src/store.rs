//! Persistence trait for connection records.

use async_trait::async_trait;

use crate::{Result, types::ConnectionRecord};

/// Persistence backend for connection records, keyed by platform id.
///
/// Deliberately narrow: the manager is the only writer, and swapping the
/// backing (plain file today, encrypted store later) must not touch it.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// All persisted records. Called once per process, at manager startup.
    async fn load_all(&self) -> Result<Vec<ConnectionRecord>>;

    /// Insert or replace the record for `record.platform_id`.
    async fn save(&self, record: &ConnectionRecord) -> Result<()>;

    /// Remove the record for `platform_id`. Removing an absent record is Ok.
    async fn delete(&self, platform_id: &str) -> Result<()>;
}
