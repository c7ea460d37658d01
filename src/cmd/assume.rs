#[derive(clap::Args, Debug)]
pub struct AssumeArgs {
    #[clap(flatten)]
    request: crate::cmd::RequestArgs,

    /// Shell syntax of the printed statements
    ///
    /// Evaluate the output to adopt the credentials, e.g. `eval "$(assumer assume ...)"`.
    #[clap(value_enum, long, default_value = "sh")]
    format: crate::environment::OutputFormat,
}

#[tokio::main]
pub async fn run(config: &crate::config::Config, args: &AssumeArgs) -> Result<(), anyhow::Error> {
    use std::io::Write as _;

    let creds = crate::cmd::resolve_with_aws(config, &args.request).await?;
    let out = render(&creds, args.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub fn render(
    creds: &crate::credentials::CredentialSet,
    format: crate::environment::OutputFormat,
) -> Result<String, crate::error::Error> {
    let env = crate::environment::EnvironmentList::from(creds);
    format.render(&env)
}
