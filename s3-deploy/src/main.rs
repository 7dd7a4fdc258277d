use anyhow::Result;
use clap::Parser;
use s3_deploy::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // AWS_* credentials and RUST_LOG may come from a local .env file.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::info!(command = ?cli.command, "s3-deploy starting");

    if let Err(e) = run(cli).await {
        tracing::error!(error = ?e, "s3-deploy failed");
        return Err(e);
    }
    tracing::info!("s3-deploy finished");
    Ok(())
}
