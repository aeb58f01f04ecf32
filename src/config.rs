use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SuiteResult;

/// Default location of the suite configuration file
pub const CONFIG_PATH: &str = "config/config.yaml";

/// Environment variable overriding the report directory
pub const REPORT_DIR_ENV: &str = "REPORT_DIR_NAME";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default = "default_kubeconfig")]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default = "default_operator_namespace")]
    pub operator_namespace: String,

    #[serde(default = "default_test_namespace")]
    pub test_namespace: String,

    #[serde(default = "default_node_selector_label")]
    pub node_selector_label: String,

    #[serde(default = "default_pf_name")]
    pub pf_name: String,

    #[serde(default = "default_test_image")]
    pub test_image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Directory receiving JUnit reports
    #[serde(rename = "report", default = "default_report_dir")]
    pub report_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("junit")
}

fn default_kubeconfig() -> Option<PathBuf> {
    None
}

fn default_operator_namespace() -> String {
    "openshift-sriov-network-operator".to_string()
}

fn default_test_namespace() -> String {
    "sriov-operator-tests".to_string()
}

fn default_node_selector_label() -> String {
    "node-role.kubernetes.io/worker-cnf".to_string()
}

fn default_pf_name() -> String {
    "eno1".to_string()
}

fn default_test_image() -> String {
    "centos".to_string()
}

impl Config {
    /// Load the YAML file at `path`, then apply environment overrides.
    ///
    /// A relative report directory is resolved against the directory holding
    /// `config/`. `REPORT_DIR_NAME` replaces the resolved value verbatim.
    /// Other settings are read from `SRIOV_`-prefixed variables, e.g.
    /// `SRIOV_OPERATOR_NAMESPACE`.
    pub fn load(path: &Path) -> SuiteResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix("SRIOV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if config.general.report_dir.is_relative() {
            config.general.report_dir = base_dir(path).join(&config.general.report_dir);
        }
        if let Ok(dir) = std::env::var(REPORT_DIR_ENV) {
            if !dir.is_empty() {
                config.general.report_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    /// Full path of the XML report named after `file`'s stem
    pub fn report_path(&self, file: &str) -> PathBuf {
        let stem = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file);
        self.general.report_dir.join(format!("{}.xml", stem))
    }
}

/// Directory two levels above the config file (`<base>/config/config.yaml`)
fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            kubeconfig: default_kubeconfig(),
            operator_namespace: default_operator_namespace(),
            test_namespace: default_test_namespace(),
            node_selector_label: default_node_selector_label(),
            pf_name: default_pf_name(),
            test_image: default_test_image(),
        }
    }
}
