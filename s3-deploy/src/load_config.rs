/// `load_config` module: Loads a static YAML deploy config and adapts it into the core's [`DeployConfig`].
///
/// This module is the only place where user-supplied YAML is parsed and mapped
/// to strongly-typed internal structs.
///
/// # Responsibilities
/// - Parse the YAML file into serde structs (`CliConfig`)
/// - Map pattern strings and pattern lists to include/exclude [`Rule`]s
/// - Keep client settings (region, profile) apart from the deploy settings
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
/// Secrets never live in this file: AWS credentials come from the environment / profile chain.
use anyhow::Result;
use s3_deploy_core::invalidation::InvalidationConfig;
use s3_deploy_core::options::{FilesOptions, ObjectOptions, Options};
use s3_deploy_core::pipeline::DEFAULT_CONCURRENCY;
use s3_deploy_core::rule::Rule;
use s3_deploy_core::DeployConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub directory: PathBuf,
    pub bucket: String,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub options: OptionsSection,
    #[serde(default)]
    pub files_options: FilesOptions,
    #[serde(default)]
    pub invalidation: Option<InvalidationConfig>,
}

/// AWS client settings; anything unset falls back to the SDK's default chain.
#[derive(Debug, Default, Deserialize)]
pub struct ClientSection {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Custom S3 endpoint, e.g. for S3-compatible storage.
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsSection {
    #[serde(flatten)]
    pub object: ObjectOptions,
    pub include: Option<RuleSpec>,
    pub exclude: Option<RuleSpec>,
}

/// YAML form of a rule: a regex pattern string, or a list of rules that must all match.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Pattern(String),
    All(Vec<RuleSpec>),
}

impl From<RuleSpec> for Rule {
    fn from(spec: RuleSpec) -> Self {
        match spec {
            RuleSpec::Pattern(pattern) => Rule::Pattern(pattern),
            RuleSpec::All(specs) => Rule::List(specs.into_iter().map(Rule::from).collect()),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl CliConfig {
    /// Converts into the core config. Rules are validated here so a bad pattern
    /// fails at load time, before any client is built.
    pub fn into_deploy_config(self) -> Result<DeployConfig> {
        let options = Options {
            defaults: self.options.object,
            include: self.options.include.map(Rule::from),
            exclude: self.options.exclude.map(Rule::from),
        };
        for rule in [&options.include, &options.exclude].into_iter().flatten() {
            rule.validate()?;
        }

        Ok(DeployConfig {
            directory: self.directory,
            bucket: self.bucket,
            options,
            files_options: self.files_options,
            invalidation: self.invalidation,
            concurrency: self.concurrency,
        })
    }
}

/// Loads a static YAML config file (no secrets).
/// Returns the raw CLI config; see [`CliConfig::into_deploy_config`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.bucket.is_empty() {
        error!(config_path = ?path_ref, "Config has an empty bucket name");
        anyhow::bail!("bucket must not be empty");
    }

    Ok(config)
}
