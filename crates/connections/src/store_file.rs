//! JSON file-backed connection store with atomic writes.

use std::{collections::HashMap, path::PathBuf};

use {
    async_trait::async_trait,
    tokio::fs,
    tracing::debug,
};

use crate::{Result, error::Error, store::ConnectionStore, types::ConnectionRecord};

/// File-backed store. All records live in one JSON file keyed by platform
/// id; writes are atomic (temp + rename, `.bak` kept) and the file is
/// chmod 0600 on unix since it holds tokens.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load_map(&self) -> Result<HashMap<String, ConnectionRecord>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }
        let data = fs::read_to_string(&self.path).await?;
        serde_json::from_str(&data).map_err(|e| Error::store("parsing connections file", e))
    }

    async fn write_map(&self, map: &HashMap<String, ConnectionRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        // Backup existing file, then rename the temp over the target.
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let bak = self.path.with_extension("json.bak");
            let _ = fs::rename(&self.path, &bak).await;
        }
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for FileStore {
    async fn load_all(&self) -> Result<Vec<ConnectionRecord>> {
        let map = self.load_map().await?;
        Ok(map.into_values().collect())
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<()> {
        let mut map = self.load_map().await?;
        map.insert(record.platform_id.clone(), record.clone());
        self.write_map(&map).await?;
        debug!(platform_id = %record.platform_id, path = %self.path.display(), "connection record saved");
        Ok(())
    }

    async fn delete(&self, platform_id: &str) -> Result<()> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        let mut map = self.load_map().await?;
        if map.remove(platform_id).is_none() {
            return Ok(());
        }
        self.write_map(&map).await?;
        debug!(platform_id, path = %self.path.display(), "connection record deleted");
        Ok(())
    }
}
