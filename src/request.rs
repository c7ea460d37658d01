//! Input to a role assumption and the cache key derived from it.

pub const DEFAULT_DURATION_SECONDS: i32 = 3600;
/// Bounds accepted by sts:AssumeRole for DurationSeconds
pub const MIN_DURATION_SECONDS: i32 = 900;
pub const MAX_DURATION_SECONDS: i32 = 43200;

const NONE_SENTINEL: &str = "none";

static ROLE_ARN_REGEX: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
    regex::Regex::new(r"^arn:aws[a-z-]*:iam::\d{12}:role/[\w+=,.@/-]+$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssumptionRequest {
    pub role_arn: String,
    pub mfa_serial: Option<String>,
    /// sts:ExternalId, required by some cross-account trust policies
    pub external_id: Option<String>,
    pub duration_seconds: i32,
    pub session_name: String,
    pub source_profile: Option<String>,
    pub region: Option<String>,
    pub cache_enabled: bool,
}

impl RoleAssumptionRequest {
    pub fn new(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            mfa_serial: None,
            external_id: None,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            session_name: generate_session_name(),
            source_profile: None,
            region: None,
            cache_enabled: true,
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.role_arn.is_empty() {
            return Err(crate::error::Error::Validation(
                "role ARN is required".to_string(),
            ));
        }
        if !ROLE_ARN_REGEX.is_match(&self.role_arn) {
            return Err(crate::error::Error::Validation(format!(
                "malformed role ARN: {}",
                self.role_arn
            )));
        }
        if !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&self.duration_seconds) {
            return Err(crate::error::Error::Validation(format!(
                "session duration must be between {MIN_DURATION_SECONDS} and {MAX_DURATION_SECONDS} seconds, got {}",
                self.duration_seconds
            )));
        }
        if self.session_name.is_empty() {
            return Err(crate::error::Error::Validation(
                "session name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Duration and session name are intentionally left out; requests that only
    /// differ in those share one cache entry.
    pub fn cache_key(&self) -> CacheKey {
        use sha2::Digest;

        let mut hasher = sha2::Sha256::new();
        for part in [
            self.role_arn.as_str(),
            self.mfa_serial.as_deref().unwrap_or(NONE_SENTINEL),
            self.external_id.as_deref().unwrap_or(NONE_SENTINEL),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        CacheKey(base16ct::lower::encode_string(&hasher.finalize()))
    }
}

fn generate_session_name() -> String {
    format!(
        "assumer-{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp()
    )
}

/// Hex encoded SHA-256 naming a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.0)
    }
}
