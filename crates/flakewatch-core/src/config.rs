//! Analysis configuration.
//!
//! Every field has a default, so an empty YAML file is a valid configuration
//! that analyzes the nightly metal-ipi job over its last ten builds.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FLAKEWATCH_BASE_URL` | Artifact store base URL |
//! | `FLAKEWATCH_CACHE_DIR` | Directory for cached job histories |
//! | `FLAKEWATCH_TIMEOUT` | Request timeout in seconds |

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use flakewatch_artifacts::ArtifactsConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::model::ArtifactLayout;

/// Placeholder substituted with each configured version.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// How candidate build identifiers are ordered before the newest are picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildOrder {
    /// Decimal identifiers compared by value.
    #[default]
    Numeric,
    /// Identifiers compared as opaque strings: "9" sorts after "10".
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlakeConfig {
    /// Job name templates; `{version}` (or `%s`) is replaced by each version.
    #[serde(default = "default_job_name_templates")]
    pub job_name_templates: Vec<String>,

    #[serde(default = "default_versions")]
    pub versions: Vec<String>,

    /// Number of finished builds sampled per job.
    #[serde(default = "default_build_window_size")]
    pub build_window_size: usize,

    /// Tests whose outcome is noisy for reasons unrelated to the product.
    #[serde(default = "default_ignored_test_names")]
    pub ignored_test_names: BTreeSet<String>,

    #[serde(default)]
    pub build_order: BuildOrder,

    #[serde(default = "default_test_step")]
    pub test_step: String,

    /// Overrides the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

fn default_job_name_templates() -> Vec<String> {
    vec!["periodic-ci-openshift-release-master-nightly-{version}-e2e-metal-ipi".to_string()]
}

fn default_versions() -> Vec<String> {
    vec!["4.10".to_string()]
}

fn default_build_window_size() -> usize {
    10
}

fn default_ignored_test_names() -> BTreeSet<String> {
    ["[sig-arch] Monitor cluster while tests execute".to_string()]
        .into_iter()
        .collect()
}

fn default_test_step() -> String {
    "baremetalds-e2e-test".to_string()
}

impl Default for FlakeConfig {
    fn default() -> Self {
        Self {
            job_name_templates: default_job_name_templates(),
            versions: default_versions(),
            build_window_size: default_build_window_size(),
            ignored_test_names: default_ignored_test_names(),
            build_order: BuildOrder::default(),
            test_step: default_test_step(),
            cache_dir: None,
            artifacts: ArtifactsConfig::default(),
        }
    }
}

impl FlakeConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `FLAKEWATCH_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(url) = std::env::var("FLAKEWATCH_BASE_URL") {
            self.artifacts.base_url = url;
        }
        if let Ok(dir) = std::env::var("FLAKEWATCH_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Ok(timeout) = std::env::var("FLAKEWATCH_TIMEOUT") {
            self.artifacts.timeout_secs = timeout.parse().map_err(|_| ConfigError::Invalid {
                message: format!("FLAKEWATCH_TIMEOUT must be a number of seconds, got {timeout:?}"),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if self.build_window_size == 0 {
            errors.push("build_window_size must be at least 1".to_string());
        }
        if self.job_name_templates.is_empty() {
            errors.push("job_name_templates must not be empty".to_string());
        }
        if self.versions.is_empty() {
            errors.push("versions must not be empty".to_string());
        }
        if self.artifacts.base_url.trim().is_empty() {
            errors.push("artifacts.base_url must not be empty".to_string());
        }
        if self.test_step.trim().is_empty() {
            errors.push("test_step must not be empty".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid {
                message: errors.join("; "),
            });
        }
        Ok(())
    }

    /// Every template expanded with every version, versions outermost.
    pub fn job_names(&self) -> Vec<String> {
        self.versions
            .iter()
            .flat_map(|version| {
                self.job_name_templates.iter().map(move |template| {
                    template
                        .replace(VERSION_PLACEHOLDER, version)
                        .replace("%s", version)
                })
            })
            .collect()
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(self.artifacts.base_url.clone(), self.test_step.clone())
    }
}
