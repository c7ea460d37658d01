#[derive(Debug, Clone)]
pub struct Config {
    cache_dir: std::path::PathBuf,
}

const ENV_CACHE_DIR: &str = "ASSUMER_CACHE_DIR";
const CACHE_SUBDIR: &str = "assumer";

impl Config {
    /// Resolve the cache directory: explicit value, then `$ASSUMER_CACHE_DIR`,
    /// `$XDG_CACHE_HOME/assumer`, and finally `$HOME/.cache/assumer`.
    pub fn new(cache_dir: Option<std::path::PathBuf>) -> Result<Self, crate::error::Error> {
        let cache_dir_ = match cache_dir {
            Some(v) => v,
            None => default_cache_dir()?,
        };

        Ok(Self {
            cache_dir: cache_dir_,
        })
    }

    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.cache_dir.clone()
    }

    pub(crate) fn path_for_entry(&self, key: &crate::request::CacheKey) -> std::path::PathBuf {
        self.cache_dir().join(format!("{key}.json"))
    }

    pub fn cache(&self) -> crate::cache::CredentialCache<'_> {
        crate::cache::CredentialCache::new(self)
    }

    /// Ensure the cache directory exists and only the owner can enter it
    pub(crate) async fn ensure_cache_dir(&self) -> Result<(), crate::error::Error> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.cache_dir();
        tokio::fs::create_dir_all(&path).await?;
        let mut perm = tokio::fs::metadata(&path).await?.permissions();
        if perm.mode() & 0o777 != 0o700 {
            perm.set_mode(0o700);
            tokio::fs::set_permissions(&path, perm).await?;
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_cache_dir() -> Result<std::path::PathBuf, crate::error::Error> {
    if let Some(d) = non_empty_env(ENV_CACHE_DIR) {
        return Ok(d.into());
    }
    if let Some(d) = non_empty_env("XDG_CACHE_HOME") {
        return Ok(std::path::PathBuf::from(d).join(CACHE_SUBDIR));
    }
    if let Some(d) = non_empty_env("HOME") {
        return Ok(std::path::PathBuf::from(d).join(".cache").join(CACHE_SUBDIR));
    }
    Err(crate::error::Error::ConfigError(
        "cache directory is unknown; use --cache-dir or $ASSUMER_CACHE_DIR or $HOME".to_string(),
    ))
}
