//! Local video index CLI.
//!
//! Takes one JSON action request (as an argument, or `-` for stdin),
//! dispatches it through the agent, and prints the result envelope.

use std::io::Read;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vindex_agent::{ActionRequest, LocalVideoAgent};
use vindex_pipeline::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vindex=info".parse().expect("static directive"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    let raw = read_request()?;
    let request: ActionRequest =
        serde_json::from_str(&raw).context("request is not a valid action JSON document")?;

    let config = PipelineConfig::from_env();
    info!(root = %config.storage_root.display(), "Opening video index");
    let pipeline = Pipeline::new(config)
        .await
        .context("failed to open the video index")?;

    let agent = LocalVideoAgent::new(pipeline);
    let response = agent.handle(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn read_request() -> Result<String> {
    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(arg) if arg == "-" => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read request from stdin")?;
            Ok(buffer)
        }
        Some(arg) => Ok(arg),
        None => bail!("usage: vindex '<action json>' (or '-' to read stdin)"),
    }
}
