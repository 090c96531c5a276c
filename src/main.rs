use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{TargetArgs, credentials_from_lookup};
use core_types::{Context, Credentials};
use database::{Session, ping};
use replica::{ConnectionParams, ReplicaClientConfig};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the replidb command-line tool.
#[tokio::main]
async fn main() -> Result<()> {
    // LITESTREAM_* credentials are commonly kept in a .env file.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Open(args) => handle_open(args).await?,
        Commands::Parse(args) => handle_parse(args)?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Opens SQLite databases that are restored from, and replicated to, a remote replica.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a database (restoring it from its replica if missing), ping it and close it.
    Open(OpenArgs),
    /// Show how a replica descriptor resolves into client settings.
    Parse(ParseArgs),
}

#[derive(Parser)]
struct OpenArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Abort restoring and opening after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Parser)]
struct ParseArgs {
    /// The replica descriptor, e.g. "s3://bucket.us-west-000.backblazeb2.com/app".
    descriptor: String,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Open Command Logic
// ==============================================================================

async fn handle_open(args: OpenArgs) -> Result<()> {
    let config = args
        .target
        .resolve()
        .context("Failed to load configuration")?;

    let (mut ctx, cancel) = Context::background().with_cancel();
    if let Some(secs) = args.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    println!("Opening database at {}...", config.path().display());
    let mut session = Session::new(config);
    let pool = session.open(&ctx).await?;

    let pinged = ping(&pool).await;
    // The session is closed even when the ping fails.
    let closed = session.close(&Context::background()).await;
    pinged?;
    println!("Connected!");
    closed?;

    Ok(())
}

// ==============================================================================
// Parse Command Logic
// ==============================================================================

fn handle_parse(args: ParseArgs) -> Result<()> {
    let credentials = credentials_from_lookup(|key| std::env::var(key).ok());
    let params = ConnectionParams::from_descriptor(&args.descriptor, &credentials)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&params_json(&params))?);
    } else {
        println!("{}", params_table(&params));
    }
    Ok(())
}

fn params_json(params: &ConnectionParams) -> serde_json::Value {
    let client = match &params.client {
        ReplicaClientConfig::File(file) => serde_json::json!({
            "type": params.client.kind(),
            "path": file.path,
        }),
        ReplicaClientConfig::S3(s3) => serde_json::json!({
            "type": params.client.kind(),
            "bucket": s3.bucket,
            "region": s3.region,
            "endpoint": s3.endpoint,
            "path": s3.path,
            "force_path_style": s3.force_path_style,
            "access_key_id": s3.credentials.access_key_id(),
            "secret_access_key": secret_state(&s3.credentials),
        }),
    };
    serde_json::json!({
        "scheme": params.url.scheme,
        "host": params.url.host,
        "path": params.url.path,
        "client": client,
    })
}

fn params_table(params: &ConnectionParams) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["scheme", params.url.scheme.as_str()]);
    table.add_row(vec!["host", params.url.host.as_str()]);
    table.add_row(vec!["path", params.url.path.as_str()]);

    match &params.client {
        ReplicaClientConfig::File(file) => {
            table.add_row(vec!["client".to_string(), params.client.kind().to_string()]);
            table.add_row(vec!["directory".to_string(), file.path.display().to_string()]);
        }
        ReplicaClientConfig::S3(s3) => {
            table.add_row(vec!["client", params.client.kind()]);
            table.add_row(vec!["bucket", s3.bucket.as_str()]);
            table.add_row(vec!["region", s3.region.as_str()]);
            table.add_row(vec!["endpoint", s3.endpoint.as_str()]);
            table.add_row(vec!["force_path_style".to_string(), s3.force_path_style.to_string()]);
            table.add_row(vec!["access_key_id", s3.credentials.access_key_id()]);
            table.add_row(vec!["secret_access_key", secret_state(&s3.credentials)]);
        }
    }
    table
}

/// Reports whether a secret key is configured without printing it.
fn secret_state(credentials: &Credentials) -> &'static str {
    if credentials.secret_access_key().is_empty() {
        "unset"
    } else {
        "set"
    }
}
