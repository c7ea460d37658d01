//! Identity service client: sts:AssumeRole and iam:ListMFADevices

/// https://docs.aws.amazon.com/STS/latest/APIReference/API_AssumeRole.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: i32,
    pub external_id: Option<String>,
    pub mfa: Option<MfaToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaToken {
    pub serial_number: String,
    pub token_code: String,
}

/// The external identity system, as consumed by the session manager.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Serial numbers of MFA devices registered to the caller, in service order.
    async fn list_mfa_devices(&self) -> Result<Vec<String>, crate::error::Error>;

    async fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> Result<crate::credentials::CredentialSet, crate::error::Error>;
}

/// STS is a global service; used when neither options nor profile name a region
pub const DEFAULT_REGION: &str = "us-east-1";

pub struct Client {
    sts: aws_sdk_sts::Client,
    iam: aws_sdk_iam::Client,
}

impl Client {
    pub async fn new(source_profile: Option<&str>, region: Option<&str>) -> Self {
        let sdk_config = load_sdk_config(source_profile, region).await;
        Self {
            sts: aws_sdk_sts::Client::new(&sdk_config),
            iam: aws_sdk_iam::Client::new(&sdk_config),
        }
    }
}

async fn load_sdk_config(
    source_profile: Option<&str>,
    region: Option<&str>,
) -> aws_config::SdkConfig {
    let loader = || {
        let mut l = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(p) = source_profile {
            l = l.profile_name(p);
        }
        l
    };

    if let Some(r) = region {
        return loader()
            .region(aws_config::Region::new(r.to_owned()))
            .load()
            .await;
    }

    let loaded = loader().load().await;
    match loaded.region() {
        Some(r) => {
            tracing::debug!(message = "Using region from environment", region = %r);
            loaded
        }
        None => {
            tracing::debug!(message = "No region configured, using default", region = DEFAULT_REGION);
            loader()
                .region(aws_config::Region::new(DEFAULT_REGION))
                .load()
                .await
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for Client {
    async fn list_mfa_devices(&self) -> Result<Vec<String>, crate::error::Error> {
        let out = self
            .iam
            .list_mfa_devices()
            .send()
            .await
            .map_err(|e| crate::error::Error::ApiError(sdk_error_message(&e)))?;
        Ok(out
            .mfa_devices()
            .iter()
            .map(|d| d.serial_number().to_owned())
            .collect())
    }

    async fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> Result<crate::credentials::CredentialSet, crate::error::Error> {
        let (serial_number, token_code) = match request.mfa {
            Some(ref m) => (Some(m.serial_number.clone()), Some(m.token_code.clone())),
            None => (None, None),
        };

        let resp = self
            .sts
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.role_session_name)
            .duration_seconds(request.duration_seconds)
            .set_external_id(request.external_id.clone())
            .set_serial_number(serial_number)
            .set_token_code(token_code)
            .send()
            .await
            .map_err(|e| crate::error::Error::ApiError(sdk_error_message(&e)))?;

        let creds = resp.credentials().ok_or_else(|| {
            crate::error::Error::Unknown("AssumeRole response is missing Credentials".to_string())
        })?;
        let expiration = chrono::DateTime::<chrono::Utc>::from_timestamp(
            creds.expiration().secs(),
            creds.expiration().subsec_nanos(),
        )
        .ok_or_else(|| {
            crate::error::Error::Unknown("AssumeRole returned an out of range Expiration".to_string())
        })?;

        Ok(crate::credentials::CredentialSet {
            access_key_id: creds.access_key_id().to_owned(),
            secret_access_key: crate::credentials::SecretAccessKey::new(
                creds.secret_access_key().to_owned(),
            ),
            session_token: creds.session_token().to_owned(),
            expiration,
        })
    }
}

/// Both SDK crates re-export the same smithy `SdkError` and metadata trait.
fn sdk_error_message<E, R>(e: &aws_sdk_sts::error::SdkError<E, R>) -> String
where
    E: aws_sdk_sts::error::ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    e.as_service_error()
        .and_then(|se| service_error_message(se.code(), se.message()))
        .unwrap_or_else(|| aws_sdk_sts::error::DisplayErrorContext(e).to_string())
}

fn service_error_message(code: Option<&str>, message: Option<&str>) -> Option<String> {
    match (code, message) {
        (Some(c), Some(m)) => Some(format!("{c}: {m}")),
        (None, Some(m)) => Some(m.to_owned()),
        (Some(c), None) => Some(c.to_owned()),
        (None, None) => None,
    }
}
