#[derive(clap::Args, Debug)]
pub struct CredentialProcessArgs {
    #[clap(flatten)]
    request: crate::cmd::RequestArgs,
}

/// https://docs.aws.amazon.com/sdkref/latest/guide/feature-process-credentials.html
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialProcessResponse {
    pub version: i64,
    pub access_key_id: String,
    pub secret_access_key: crate::credentials::SecretAccessKey,
    pub session_token: String,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

impl From<crate::credentials::CredentialSet> for CredentialProcessResponse {
    fn from(creds: crate::credentials::CredentialSet) -> Self {
        Self {
            version: 1,
            access_key_id: creds.access_key_id,
            secret_access_key: creds.secret_access_key,
            session_token: creds.session_token,
            expiration: creds.expiration,
        }
    }
}

#[tokio::main]
pub async fn run(
    config: &crate::config::Config,
    args: &CredentialProcessArgs,
) -> Result<(), anyhow::Error> {
    let creds = crate::cmd::resolve_with_aws(config, &args.request).await?;
    let result = CredentialProcessResponse::from(creds);

    {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer(&mut stdout, &result)?;
    }
    Ok(())
}
