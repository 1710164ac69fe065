mod executor;
mod ops;

use clap::{Parser, Subcommand};
use ops::{approve_command, run_command, OutputFormat, RunOptions};
use scriptinel_core::{
    find_policy_file, LifecycleScript, ScriptinelError, EXIT_INTERNAL_FAILURE, EXIT_SUCCESS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install npm dependencies with lifecycle scripts gated by a reviewed policy.
#[derive(Parser)]
#[command(name = "scriptinel", author, version)]
struct Cli {
    /// Project directory holding package.json and the lockfile
    #[arg(long, global = true, env = "SCRIPTINEL_PROJECT_ROOT", default_value = ".")]
    project_root: PathBuf,

    /// Policy file, resolved against the project root
    #[arg(long, global = true, env = "SCRIPTINEL_POLICY")]
    policy: Option<PathBuf>,

    /// Fail with a non-zero exit code when unapproved scripts are found
    #[arg(long, global = true)]
    ci: bool,

    /// Only report; skip npm install and script execution
    #[arg(long, global = true)]
    audit: bool,

    /// Report format
    #[arg(long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install with scripts disabled, audit them, then run the approved ones (default)
    Run,
    /// Add a package's lifecycle scripts to the allow list
    Approve {
        /// Package name as it appears in node_modules
        package: String,
        /// Approve only these scripts instead of everything detected
        #[arg(long = "script")]
        scripts: Vec<LifecycleScript>,
    },
}

impl Cli {
    fn policy_path(&self) -> PathBuf {
        match &self.policy {
            Some(path) => self.project_root.join(path),
            None => find_policy_file(&self.project_root),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS as u8),
        Err(err) => {
            let code = err
                .downcast_ref::<ScriptinelError>()
                .map_or(EXIT_INTERNAL_FAILURE, ScriptinelError::exit_code);
            error!("{err:#}");
            ExitCode::from(code as u8)
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let policy_path = cli.policy_path();
    match cli.command {
        None | Some(Commands::Run) => {
            let options = RunOptions {
                ci: cli.ci,
                audit: cli.audit,
                output: cli.output,
            };
            run_command(&cli.project_root, &policy_path, options).await
        }
        Some(Commands::Approve { package, scripts }) => {
            approve_command(&cli.project_root, &policy_path, &package, &scripts)
        }
    }
}

fn init_tracing() {
    // Reports go to stdout; keep logs out of the way of --output json.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
