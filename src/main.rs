use std::fs::File;
use std::path::PathBuf;

use azchat::core::config::{self, CliOverrides};
use azchat::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "azchat", about = "Terminal chat for Azure OpenAI with Microsoft sign-in")]
struct Args {
    /// Deployment to chat with (overrides DEPLOYMENT_NAME)
    #[arg(short, long)]
    deployment: Option<String>,

    /// Azure OpenAI endpoint (overrides ENDPOINT_URL)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Redirect URI registered for the app (overrides REDIRECT_URI)
    #[arg(long)]
    redirect_uri: Option<String>,

    /// Config file to read instead of ~/.azchat/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity of azchat.log
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to azchat.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("azchat.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("azchat: {e}");
            return Err(std::io::Error::other(e));
        }
    };

    let cli = CliOverrides {
        deployment: args.deployment,
        endpoint: args.endpoint,
        redirect_uri: args.redirect_uri,
    };
    let resolved = config::resolve(&file_config, &cli, &config::process_env);

    log::info!(
        "azchat starting up: deployment={}, endpoint={}",
        resolved.deployment,
        resolved.endpoint
    );

    tui::run(resolved)
}
