//! On-disk cache of issued credentials, one JSON file per cache key.
//!
//! There is no locking; concurrent writers for the same key race and the last
//! rename wins. Entries are never removed, stale ones are simply overwritten.

pub struct CredentialCache<'a> {
    config: &'a crate::config::Config,
}

impl<'a> CredentialCache<'a> {
    pub fn new(config: &'a crate::config::Config) -> Self {
        Self { config }
    }

    pub fn path(&self, key: &crate::request::CacheKey) -> std::path::PathBuf {
        self.config.path_for_entry(key)
    }

    /// Read an entry regardless of its expiration. Anything unreadable is a miss.
    pub async fn read(
        &self,
        key: &crate::request::CacheKey,
    ) -> Option<crate::credentials::CredentialSet> {
        let path = self.path(key);
        let content = match tokio::fs::read(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(message = "cache entry not found", path = ?path);
                return None;
            }
            Err(e) => {
                tracing::debug!(message = "failed to read cache entry", path = ?path, error = ?e);
                return None;
            }
        };
        match serde_json::from_slice(&content) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(message = "ignoring malformed cache entry", path = ?path, error = ?e);
                None
            }
        }
    }

    /// Return the entry only if it is still fresh at `now`.
    pub async fn load(
        &self,
        key: &crate::request::CacheKey,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<crate::credentials::CredentialSet> {
        let creds = self.read(key).await?;
        if creds.is_fresh(now) {
            Some(creds)
        } else {
            tracing::debug!(message = "cache entry is stale", cache_key = %key, expiration = %creds.expiration);
            None
        }
    }

    pub async fn store(
        &self,
        key: &crate::request::CacheKey,
        creds: &crate::credentials::CredentialSet,
    ) -> Result<(), crate::error::Error> {
        use tokio::io::AsyncWriteExt;

        let json = serde_json::to_vec_pretty(creds)?;

        self.config.ensure_cache_dir().await?;

        let path = self.path(key);
        let path_wip = self
            .config
            .cache_dir()
            .join(format!(".wip.{}.{}", key, std::process::id()));
        {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path_wip)
                .await?;
            file.write_all(&json).await?;
            file.write_all("\n".as_bytes()).await?;
            file.flush().await?;
        }
        if let Err(e) = tokio::fs::rename(&path_wip, &path).await {
            remove_file_ignoring_enoent(&path_wip).await.ok();
            return Err(e.into());
        }
        Ok(())
    }
}

async fn remove_file_ignoring_enoent(path: &std::path::Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(v) => Ok(v),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
