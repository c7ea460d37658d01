//! Temporary security credentials issued by an AssumeRole call.

/// Seconds of validity an entry must still have to be reused
pub const FRESHNESS_MARGIN_SECONDS: i64 = 300;

/// Secret access key. Never shows up in `Debug` output.
#[derive(Clone)]
pub struct SecretAccessKey(secrecy::SecretString);

impl SecretAccessKey {
    pub fn new(value: String) -> Self {
        Self(secrecy::SecretString::new(value))
    }
}

impl secrecy::ExposeSecret<String> for SecretAccessKey {
    fn expose_secret(&self) -> &String {
        use secrecy::ExposeSecret;
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SecretAccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str("SecretAccessKey([REDACTED])")
    }
}

impl PartialEq for SecretAccessKey {
    fn eq(&self, other: &Self) -> bool {
        use secrecy::ExposeSecret;
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for SecretAccessKey {}

impl From<&str> for SecretAccessKey {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl serde::Serialize for SecretAccessKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use secrecy::ExposeSecret;
        serializer.serialize_str(self.expose_secret())
    }
}

impl<'de> serde::Deserialize<'de> for SecretAccessKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Same layout as the `Credentials` object of an STS AssumeRole response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialSet {
    pub access_key_id: String,
    pub secret_access_key: SecretAccessKey,
    pub session_token: String,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

impl CredentialSet {
    pub fn remaining(&self, now: chrono::DateTime<chrono::Utc>) -> chrono::Duration {
        self.expiration.signed_duration_since(now)
    }

    /// True while more than [`FRESHNESS_MARGIN_SECONDS`] remain before expiration.
    pub fn is_fresh(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.remaining(now) > chrono::Duration::seconds(FRESHNESS_MARGIN_SECONDS)
    }
}
