//! Render credentials as statements a shell can evaluate.

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_SESSION_EXPIRATION: &str = "AWS_SESSION_EXPIRATION";

/// Would take precedence over the exported keys in SDKs and the CLI
pub const AWS_PROFILE: &str = "AWS_PROFILE";

type EnvironmentListInner = Vec<(&'static str, String)>;

/// Variables to set, plus variables to clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentList {
    inner: EnvironmentListInner,
    unset: Vec<&'static str>,
}

impl EnvironmentList {
    pub fn into_inner(self) -> EnvironmentListInner {
        self.inner
    }

    pub fn unset(&self) -> &[&'static str] {
        &self.unset
    }
}

impl std::ops::Deref for EnvironmentList {
    type Target = EnvironmentListInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<&crate::credentials::CredentialSet> for EnvironmentList {
    fn from(creds: &crate::credentials::CredentialSet) -> Self {
        use secrecy::ExposeSecret;
        Self {
            inner: vec![
                (AWS_ACCESS_KEY_ID, creds.access_key_id.clone()),
                (
                    AWS_SECRET_ACCESS_KEY,
                    creds.secret_access_key.expose_secret().clone(),
                ),
                (AWS_SESSION_TOKEN, creds.session_token.clone()),
                (AWS_SESSION_EXPIRATION, format_expiration(&creds.expiration)),
            ],
            unset: vec![AWS_PROFILE],
        }
    }
}

pub fn format_expiration(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// POSIX shell: `export NAME='value'`
    Sh,
    /// fish: `set -gx NAME 'value';`
    Fish,
    /// A JSON object keyed by variable name
    Json,
}

impl OutputFormat {
    pub fn render(&self, env: &EnvironmentList) -> Result<String, crate::error::Error> {
        use std::fmt::Write as _;

        let mut out = String::new();
        match *self {
            Self::Sh => {
                for name in env.unset() {
                    writeln!(out, "unset {name}").ok();
                }
                for (k, v) in env.iter() {
                    writeln!(out, "export {k}={}", single_quote(v)).ok();
                }
            }
            Self::Fish => {
                for name in env.unset() {
                    writeln!(out, "set -e {name};").ok();
                }
                for (k, v) in env.iter() {
                    writeln!(out, "set -gx {k} {};", single_quote(v)).ok();
                }
            }
            Self::Json => {
                let map: serde_json::Map<String, serde_json::Value> = env
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                    .collect();
                out = serde_json::to_string_pretty(&map)?;
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Quote for both POSIX sh and fish; `'` is closed, escaped, and reopened.
fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
