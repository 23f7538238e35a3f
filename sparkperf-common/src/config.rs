//! Run configuration for sparkperf
//!
//! Everything the suite catalog and the output naming need is collected into
//! one immutable [`PerfConfig`], built once at process start from defaults, an
//! optional TOML file and a handful of environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PerfError, Result};
use crate::types::{PlatformVersion, RenderKind, ScalarValue};

pub const ENV_HOME: &str = "HOME";
pub const ENV_SPARK_HOME: &str = "SPARK_HOME";
pub const ENV_CLUSTER_URL: &str = "SPARKPERF_CLUSTER_URL";
pub const ENV_SCALE_FACTOR: &str = "SPARKPERF_SCALE_FACTOR";
pub const ENV_HDFS_URL: &str = "SPARKPERF_HDFS_URL";
pub const ENV_COMMIT_ID: &str = "SPARKPERF_COMMIT_ID";
pub const ENV_MLLIB_VERSION: &str = "SPARKPERF_MLLIB_VERSION";

const DEFAULT_HDFS_HOST: &str = "localhost";

/// HDFS location used for persisted inputs and streaming checkpoints.
pub fn default_hdfs_url(host: &str) -> String {
    format!("hdfs://{}:9000/test/", host)
}

/// Cluster the benchmarks are submitted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Fallback for `spark_home` when unset
    pub home_dir: PathBuf,
    /// Spark installation on the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spark_home: Option<PathBuf>,
    /// Custom configuration directory, `<spark_home>/conf` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spark_conf_dir: Option<PathBuf>,
    /// Master URL: `yarn`, `spark://host:7077`, `mesos://...`
    pub cluster_url: String,
    /// URI of the Spark executor package (Mesos only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor_uri: Option<String>,
    /// Path to the Mesos native library (Mesos only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesos_native_library: Option<PathBuf>,
    /// Coarse-grained Mesos scheduling (Mesos only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesos_coarse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdfs_url: Option<String>,
    /// Restart the master and all workers before running
    pub restart_cluster: bool,
    /// Rsync `spark_home` to all workers
    pub rsync_spark_home: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            home_dir: PathBuf::from("."),
            spark_home: None,
            spark_conf_dir: None,
            cluster_url: "yarn".to_string(),
            executor_uri: None,
            mesos_native_library: None,
            mesos_coarse: None,
            hdfs_url: None,
            restart_cluster: true,
            rsync_spark_home: true,
        }
    }
}

impl ClusterConfig {
    pub fn spark_home(&self) -> &Path {
        self.spark_home.as_deref().unwrap_or(&self.home_dir)
    }

    pub fn conf_dir(&self) -> PathBuf {
        self.spark_conf_dir
            .clone()
            .unwrap_or_else(|| self.spark_home().join("conf"))
    }

    pub fn is_yarn_mode(&self) -> bool {
        self.cluster_url.contains("yarn")
    }

    pub fn is_mesos_mode(&self) -> bool {
        self.cluster_url.contains("mesos")
    }

    /// Yarn manages its own executors, so a restart never applies there.
    pub fn should_restart_cluster(&self) -> bool {
        self.restart_cluster && !self.is_yarn_mode()
    }

    pub fn hdfs_url(&self) -> String {
        self.hdfs_url
            .clone()
            .unwrap_or_else(|| default_hdfs_url(DEFAULT_HDFS_HOST))
    }
}

/// Which Spark build the tests run against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Submit with the existing cluster installation instead of building one
    pub use_cluster_spark: bool,
    /// Commit hash, branch (`origin/branch-0.7`), tag or pull request (`origin/pr/675`)
    pub commit_id: String,
    pub git_repo: String,
    pub merge_commit_into_master: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            use_cluster_spark: true,
            commit_id: String::new(),
            git_repo: "https://github.com/apache/spark.git".to_string(),
            merge_commit_into_master: false,
        }
    }
}

impl BuildConfig {
    pub fn prep_spark(&self) -> bool {
        !self.use_cluster_spark
    }
}

/// Which suites to run and which to (re)build first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteSelection {
    pub run_spark: bool,
    pub run_pyspark: bool,
    pub run_streaming: bool,
    pub run_mllib: bool,
    pub run_python_mllib: bool,
    pub prep_spark: bool,
    pub prep_pyspark: bool,
    pub prep_streaming: bool,
    pub prep_mllib: bool,
}

impl Default for SuiteSelection {
    fn default() -> Self {
        Self {
            run_spark: false,
            run_pyspark: false,
            run_streaming: false,
            run_mllib: true,
            run_python_mllib: false,
            prep_spark: false,
            prep_pyspark: false,
            prep_streaming: false,
            prep_mllib: true,
        }
    }
}

impl SuiteSelection {
    pub fn all() -> Self {
        Self {
            run_spark: true,
            run_pyspark: true,
            run_streaming: true,
            run_mllib: true,
            run_python_mllib: true,
            ..Self::default()
        }
    }
}

/// Local disk warm-up, only needed on fresh EC2 volumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskWarmupConfig {
    pub enabled: bool,
    /// Bytes written to each local directory
    pub bytes: u64,
    /// Files the bytes are evenly divided across
    pub files: u32,
}

impl Default for DiskWarmupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bytes: 200 * 1024 * 1024,
            files: 200,
        }
    }
}

/// Knobs shared by every test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestTuning {
    /// Multiplier for size-related axes. The defaults suit roughly 20
    /// m1.xlarge nodes; use something like 0.001 on a single machine.
    pub scale_factor: f64,
    /// Leading trials dropped from reported statistics (JIT and cache warm-up)
    pub ignored_trials: u32,
    pub driver_memory: String,
    /// Spark version the MLlib tests are built against
    pub mllib_version: PlatformVersion,
    pub prompt_for_deletes: bool,
}

impl Default for TestTuning {
    fn default() -> Self {
        Self {
            scale_factor: 0.05,
            ignored_trials: 2,
            driver_memory: "1g".to_string(),
            mllib_version: PlatformVersion::new(2, 0),
            prompt_for_deletes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
        }
    }
}

/// One axis of a test declared in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    #[serde(default)]
    pub kind: RenderKind,
    pub name: String,
    #[serde(default)]
    pub values: Vec<ScalarValue>,
    #[serde(default)]
    pub scalable: bool,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A test declared in the configuration file on top of the built-in catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraTestSpec {
    /// Suite the test joins: spark, pyspark, streaming, mllib, python-mllib
    pub suite: String,
    pub short_name: String,
    /// Defaults to the suite's launch target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_target: Option<String>,
    /// Applied on top of the global scale factor
    #[serde(default = "default_multiplier")]
    pub scale_multiplier: f64,
    /// Start from the suite's common system properties
    #[serde(default = "default_true")]
    pub inherit_env: bool,
    #[serde(default)]
    pub env_axes: Vec<AxisSpec>,
    #[serde(default)]
    pub cli_axes: Vec<AxisSpec>,
}

/// Complete sparkperf configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfConfig {
    pub cluster: ClusterConfig,
    pub build: BuildConfig,
    pub suites: SuiteSelection,
    pub disk_warmup: DiskWarmupConfig,
    pub tests: TestTuning,
    pub output: OutputConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_tests: Vec<ExtraTestSpec>,
}

impl PerfConfig {
    /// Defaults with process environment overrides and the local host name
    /// folded in. Call once at startup.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.fill_hdfs_from_hostname();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; `apply_env_overrides` passes the
    /// process environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup(ENV_HOME) {
            self.cluster.home_dir = PathBuf::from(home);
        }

        if let Some(spark_home) = lookup(ENV_SPARK_HOME) {
            self.cluster.spark_home = Some(PathBuf::from(spark_home));
        }

        if let Some(url) = lookup(ENV_CLUSTER_URL) {
            self.cluster.cluster_url = url;
        }

        if let Some(url) = lookup(ENV_HDFS_URL) {
            self.cluster.hdfs_url = Some(url);
        }

        if let Some(commit) = lookup(ENV_COMMIT_ID) {
            self.build.commit_id = commit;
        }

        if let Some(factor) = lookup(ENV_SCALE_FACTOR) {
            self.tests.scale_factor = factor.trim().parse().map_err(|_| {
                PerfError::Config(format!("{} is not a number: {}", ENV_SCALE_FACTOR, factor))
            })?;
        }

        if let Some(version) = lookup(ENV_MLLIB_VERSION) {
            self.tests.mllib_version = version.parse()?;
        }

        Ok(())
    }

    /// Default the HDFS URL to this machine's host name when nothing set it.
    pub fn fill_hdfs_from_hostname(&mut self) {
        if self.cluster.hdfs_url.is_some() {
            return;
        }
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| DEFAULT_HDFS_HOST.to_string());
        debug!("Defaulting HDFS URL to host {}", host);
        self.cluster.hdfs_url = Some(default_hdfs_url(&host));
    }

    pub fn validate(&self) -> Result<()> {
        let factor = self.tests.scale_factor;
        if !(factor.is_finite() && factor > 0.0) {
            return Err(PerfError::NonPositiveScaleFactor(factor));
        }

        if self.tests.driver_memory.trim().is_empty() {
            return Err(PerfError::Config("driver_memory must not be empty".to_string()));
        }

        if self.cluster.cluster_url.trim().is_empty() {
            return Err(PerfError::Config("cluster_url must not be empty".to_string()));
        }

        if self.disk_warmup.enabled && self.disk_warmup.files == 0 {
            return Err(PerfError::Config(
                "disk_warmup.files must be > 0 when warm-up is enabled".to_string(),
            ));
        }

        for extra in &self.extra_tests {
            if !(extra.scale_multiplier.is_finite() && extra.scale_multiplier > 0.0) {
                return Err(PerfError::NonPositiveScaleFactor(extra.scale_multiplier));
            }
        }

        Ok(())
    }
}

pub async fn load_from_file(path: &Path) -> Result<PerfConfig> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: PerfConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub async fn save_to_file(config: &PerfConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, content).await?;
    Ok(())
}

pub fn generate_default_config() -> PerfConfig {
    PerfConfig::default()
}
