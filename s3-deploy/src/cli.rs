///
/// This module implements the CLI interface for s3-deploy: command parsing,
/// client construction, and user-visible output.
///
/// All core business logic (discovery, key derivation, bounded upload,
/// invalidation planning) lives in the [`s3-deploy-core`] crate.
/// This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: `s3-deploy deploy --config deploy.yaml`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`s3-deploy-core`]: ../../s3-deploy-core/
use crate::aws::{load_sdk_config, CloudFrontCdn, S3Storage};
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use s3_deploy_core::contract::ExplicitPathsCheck;
use s3_deploy_core::deploy;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for s3-deploy: upload a directory to S3 and invalidate CloudFront.
#[derive(Parser)]
#[clap(
    name = "s3-deploy",
    version,
    about = "Upload a directory tree to an S3 bucket and optionally invalidate a CloudFront distribution"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every matching file under the configured directory
    Deploy {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Directory to upload; overrides `directory` in the config file
        #[clap(long)]
        directory: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Deploy { config, directory } => {
            let mut cli_config = load_config(&config)?;
            if let Some(directory) = directory {
                tracing::info!(directory = %directory.display(), "Directory overridden from command line");
                cli_config.directory = directory;
            }

            let sdk_config = load_sdk_config(&cli_config.client).await;
            let storage = Arc::new(S3Storage::new(&sdk_config, &cli_config.client));
            let cdn = CloudFrontCdn::new(&sdk_config);

            let deploy_config = cli_config.into_deploy_config()?;
            deploy_config.trace_loaded();
            tracing::info!(command = "deploy", "Starting deploy");

            match deploy(&deploy_config, storage, &cdn, &ExplicitPathsCheck).await {
                Ok(report) => {
                    println!("> All files uploaded successfully!");
                    println!("\n[result] URLs of uploaded files");
                    for location in report.locations() {
                        println!("{location}");
                    }
                    if let Some(id) = &report.invalidation_id {
                        println!("\n[result] Cloudfront invalidation created: {id}");
                    }
                    tracing::info!(
                        command = "deploy",
                        uploaded = report.uploaded.len(),
                        invalidation_id = ?report.invalidation_id,
                        "Deploy complete"
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "deploy", error = %e, "Deploy failed");
                    Err(e).with_context(|| {
                        format!("Deploy of {} failed", deploy_config.directory.display())
                    })
                }
            }
        }
    }
}
