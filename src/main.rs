#[derive(clap::Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Directory holding cached credentials
    ///
    /// Defaults to $XDG_CACHE_HOME/assumer or ~/.cache/assumer.
    #[clap(long, global = true, env = "ASSUMER_CACHE_DIR")]
    cache_dir: Option<std::path::PathBuf>,

    /// Log progress and diagnostics to stderr; RUST_LOG takes precedence
    #[clap(short, long, global = true, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Assume a role and print shell statements exporting the credentials
    Assume(assumer::cmd::assume::AssumeArgs),
    /// Assume a role and print credentials in the credential_process JSON format
    CredentialProcess(assumer::cmd::credential_process::CredentialProcessArgs),
}

fn main() -> std::process::ExitCode {
    use clap::Parser;
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e);
            eprintln!("Error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), anyhow::Error> {
    let config = assumer::config::Config::new(cli.cache_dir)?;

    match cli.command {
        Commands::Assume(ref args) => assumer::cmd::assume::run(&config, args),
        Commands::CredentialProcess(ref args) => {
            assumer::cmd::credential_process::run(&config, args)
        }
    }
}

/// stdout is reserved for credentials, so logs go to stderr.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "assumer=debug,info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
