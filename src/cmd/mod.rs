pub mod assume;
pub mod credential_process;

/// Options shared by every command that assumes a role
#[derive(clap::Args, Debug, Clone)]
pub struct RequestArgs {
    #[clap(value_parser)]
    /// IAM Role ARN to assume
    role_arn: String,
    /// Serial number (ARN) of an MFA device; defaults to the caller's first registered device
    #[clap(long)]
    mfa_serial: Option<String>,
    /// MFA one-time code; prompted on the terminal when omitted
    #[clap(long, env = "ASSUMER_MFA_CODE", hide_env_values = true)]
    mfa_code: Option<String>,
    /// External ID required by the role's trust policy
    #[clap(long)]
    external_id: Option<String>,
    /// Session duration in seconds
    ///
    /// Default 3600 seconds (1 hour); 900 seconds minimum and 43200 seconds maximum, further
    /// limited by the role's maximum session duration.
    #[clap(long, default_value_t = crate::request::DEFAULT_DURATION_SECONDS)]
    duration: i32,
    /// Session name for AssumeRole; generated when omitted
    #[clap(long)]
    session_name: Option<String>,
    /// Named profile holding the credentials used to call AssumeRole
    #[clap(long)]
    source_profile: Option<String>,
    /// AWS region for the STS endpoint
    #[clap(long)]
    region: Option<String>,
    /// Always call AssumeRole; neither read nor write the credential cache
    #[clap(long, action = clap::ArgAction::SetTrue)]
    no_cache: bool,
}

impl RequestArgs {
    pub fn to_request(&self) -> crate::request::RoleAssumptionRequest {
        let mut req = crate::request::RoleAssumptionRequest::new(self.role_arn.clone());
        req.mfa_serial = self.mfa_serial.clone();
        req.external_id = self.external_id.clone();
        req.duration_seconds = self.duration;
        if let Some(ref n) = self.session_name {
            req.session_name = n.clone();
        }
        req.source_profile = self.source_profile.clone();
        req.region = self.region.clone();
        req.cache_enabled = !self.no_cache;
        req
    }

    pub fn code_provider(&self) -> Box<dyn crate::mfa::CodeProvider> {
        match self.mfa_code {
            Some(ref c) => Box::new(crate::mfa::StaticCodeProvider::new(c.clone())),
            None => Box::new(crate::mfa::TerminalCodeProvider),
        }
    }
}

/// Resolve credentials against AWS for the given arguments.
pub(crate) async fn resolve_with_aws(
    config: &crate::config::Config,
    args: &RequestArgs,
) -> Result<crate::credentials::CredentialSet, crate::error::Error> {
    let request = args.to_request();
    request.validate()?;

    let client = crate::client::Client::new(
        request.source_profile.as_deref(),
        request.region.as_deref(),
    )
    .await;
    let codes = args.code_provider();
    crate::session::SessionManager::new(config, &client, codes.as_ref())
        .resolve(&request)
        .await
}
