mod app;
mod connect_commands;
mod post_commands;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::{app::App, post_commands::ContentArgs};

#[derive(Parser)]
#[command(name = "crier", about = "Post once, publish everywhere", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the standard search locations.
    #[arg(long, global = true, env = "CRIER_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every supported platform with its publishing constraints.
    Platforms {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Authorize a platform via OAuth in the browser.
    Connect {
        /// Platform id (twitter, linkedin, instagram).
        platform: String,
        /// Print the authorization URL instead of opening a browser.
        #[arg(long)]
        no_browser: bool,
    },
    /// Remove a platform connection.
    Disconnect {
        /// Platform id.
        platform: String,
    },
    /// Show connection status for all configured platforms, or one.
    Status {
        /// Platform id; omit for all.
        platform: Option<String>,
        /// Print statuses as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check content against platform constraints without posting.
    Validate {
        #[command(flatten)]
        content: ContentArgs,
        /// Print verdicts as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Publish to the given platforms now.
    Post {
        #[command(flatten)]
        content: ContentArgs,
        /// Print the dispatch report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Hand the post to the scheduler backend for later publishing.
    Schedule {
        #[command(flatten)]
        content: ContentArgs,
        /// When to publish, as Unix epoch milliseconds.
        #[arg(long)]
        at: u64,
        /// Print the dispatch report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Cancel a scheduled post.
    Cancel {
        /// Job id returned by `schedule`.
        job_id: String,
    },
}

/// Initialise tracing on stderr so stdout stays clean for command output.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = match cli.config {
        Some(ref path) => crier_config::load_config(path)?,
        None => crier_config::discover_and_load(),
    };
    debug!(configured = ?config.platforms.configured(), "config loaded");

    let app = App::init(config).await?;

    match cli.command {
        Commands::Platforms { json } => connect_commands::platforms(&app, json),
        Commands::Connect {
            platform,
            no_browser,
        } => connect_commands::connect(&app, &platform, no_browser).await,
        Commands::Disconnect { platform } => connect_commands::disconnect(&app, &platform).await,
        Commands::Status { platform, json } => {
            connect_commands::status(&app, platform.as_deref(), json)
        },
        Commands::Validate { content, json } => post_commands::validate(&content, json),
        Commands::Post { content, json } => post_commands::post(&app, &content, json).await,
        Commands::Schedule { content, at, json } => {
            post_commands::schedule(&app, &content, at, json).await
        },
        Commands::Cancel { job_id } => post_commands::cancel(&app, &job_id).await,
    }
}
