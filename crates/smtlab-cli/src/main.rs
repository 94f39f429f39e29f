use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use smtlab_app::{ReportUseCase, RunListingUseCase};
use smtlab_client::{HttpResourceClient, ResourceClient};
use smtlab_config::{Overrides, ResolvedConfig, discover_config_file, resolve};
use smtlab_render::{render_json, render_report, render_run_listing};
use smtlab_types::Id;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(
    name = "smtlab",
    version,
    about = "Run reports and validation cross-checks for the SMTLab benchmarking service"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log filter (e.g. "debug", "smtlab_client=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// Base URL of the SMTLab API
    #[arg(long, global = true, env = "SMTLAB_API_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, global = true, env = "SMTLAB_USERNAME")]
    username: Option<String>,

    #[arg(long, global = true, env = "SMTLAB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Config file (default: ./smtlab.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-request timeout (e.g. "30s")
    #[arg(long, global = true)]
    timeout: Option<String>,

    /// Maximum result-detail fetches in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize a run and cross-check its validations.
    Results {
        /// Identifier of the run
        run_id: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Exit 2 when any instance has validation issues
        #[arg(long, default_value_t = false)]
        fail_on_issues: bool,
    },

    /// List every run on the server.
    Runs {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = load_config(&cli.connection)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    match cli.cmd {
        Command::Results {
            run_id,
            format,
            out,
            pretty,
            fail_on_issues,
        } => {
            // Reject a bad id before anything touches the network.
            let run_id: Id = run_id.parse()?;
            let client = http_client(&config)?;
            let report =
                runtime.block_on(ReportUseCase::new(client, config.concurrency).execute(run_id))?;

            let rendered = match format {
                OutputFormat::Text => render_report(&report),
                OutputFormat::Json => render_json(&report, pretty)?,
            };
            emit(out.as_deref(), &rendered)?;

            if fail_on_issues && report.validation.instances_with_issues > 0 {
                return Ok(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Runs {
            format,
            out,
            pretty,
        } => {
            let client = http_client(&config)?;
            let listing = runtime.block_on(RunListingUseCase::new(client).execute())?;

            let rendered = match format {
                OutputFormat::Text => render_run_listing(&listing),
                OutputFormat::Json => render_json(&listing, pretty)?,
            };
            emit(out.as_deref(), &rendered)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &ConnectionArgs) -> anyhow::Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let file = discover_config_file(args.config.as_deref(), &cwd)?;
    let resolved = resolve(
        file,
        Overrides {
            endpoint: args.endpoint.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            timeout: args.timeout.clone(),
            concurrency: args.concurrency,
        },
    )?;
    tracing::debug!(
        endpoint = %resolved.client.endpoint,
        authenticated = resolved.client.credentials.is_some(),
        concurrency = resolved.concurrency,
        "resolved configuration"
    );
    Ok(resolved)
}

fn http_client(config: &ResolvedConfig) -> anyhow::Result<Arc<dyn ResourceClient>> {
    Ok(Arc::new(HttpResourceClient::new(config.client.clone())?))
}

fn emit(out: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    let Some(path) = out else {
        print!("{rendered}");
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    atomic_write(path, rendered.as_bytes())
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
