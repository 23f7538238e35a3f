//! Test descriptors and the suites that group them

use serde::Serialize;
use sparkperf_common::{PerfError, PlatformVersion, Result, SuiteSelection};
use std::fmt;
use std::str::FromStr;

use crate::expander::{self, validate_scale_factor, ArgumentList, ExpansionResult};
use crate::option::OptionAxis;
use crate::registry::VersionGate;

/// The benchmark suites sparkperf knows how to configure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteKind {
    /// Core engine, Scala driver
    Spark,
    /// Core engine, Python driver
    PySpark,
    Streaming,
    Mllib,
    /// MLlib, Python driver
    PythonMllib,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 5] = [
        SuiteKind::Spark,
        SuiteKind::PySpark,
        SuiteKind::Streaming,
        SuiteKind::Mllib,
        SuiteKind::PythonMllib,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SuiteKind::Spark => "spark",
            SuiteKind::PySpark => "pyspark",
            SuiteKind::Streaming => "streaming",
            SuiteKind::Mllib => "mllib",
            SuiteKind::PythonMllib => "python-mllib",
        }
    }

    /// Driver class or script used when a test does not name its own
    pub fn default_launch_target(&self) -> &'static str {
        match self {
            SuiteKind::Spark => "spark.perf.TestRunner",
            SuiteKind::PySpark => "core_tests.py",
            SuiteKind::Streaming => "streaming.perf.TestRunner",
            SuiteKind::Mllib => "mllib.perf.TestRunner",
            SuiteKind::PythonMllib => "mllib_tests.py",
        }
    }

    /// Prefix of the suite's result file name
    pub fn output_prefix(&self) -> &'static str {
        match self {
            SuiteKind::Spark => "spark",
            SuiteKind::PySpark => "python",
            SuiteKind::Streaming => "streaming",
            SuiteKind::Mllib => "mllib",
            SuiteKind::PythonMllib => "python_mllib",
        }
    }

    pub fn is_enabled(&self, selection: &SuiteSelection) -> bool {
        match self {
            SuiteKind::Spark => selection.run_spark,
            SuiteKind::PySpark => selection.run_pyspark,
            SuiteKind::Streaming => selection.run_streaming,
            SuiteKind::Mllib => selection.run_mllib,
            SuiteKind::PythonMllib => selection.run_python_mllib,
        }
    }

    /// Whether the suite's test jars/scripts should be rebuilt first.
    /// The Python MLlib suite shares the MLlib build.
    pub fn needs_prep(&self, selection: &SuiteSelection) -> bool {
        match self {
            SuiteKind::Spark => selection.prep_spark,
            SuiteKind::PySpark => selection.prep_pyspark,
            SuiteKind::Streaming => selection.prep_streaming,
            SuiteKind::Mllib | SuiteKind::PythonMllib => selection.prep_mllib,
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteKind {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        SuiteKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| PerfError::UnknownSuite(s.to_string()))
    }
}

/// A test as declared in the catalog, before the scale factor is known.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDeclaration {
    pub short_name: String,
    pub launch_target: String,
    /// Applied on top of the global scale factor
    pub scale_multiplier: f64,
    pub env_axes: Vec<OptionAxis>,
    pub cli_axes: Vec<OptionAxis>,
    /// The test is only declared for versions this gate allows
    pub gate: Option<VersionGate>,
}

impl TestDeclaration {
    pub fn new(
        short_name: impl Into<String>,
        launch_target: impl Into<String>,
        env_axes: Vec<OptionAxis>,
        cli_axes: Vec<OptionAxis>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            launch_target: launch_target.into(),
            scale_multiplier: 1.0,
            env_axes,
            cli_axes,
            gate: None,
        }
    }

    pub fn with_scale(mut self, multiplier: f64) -> Self {
        self.scale_multiplier = multiplier;
        self
    }

    pub fn with_gate(mut self, gate: VersionGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn is_declared_for(&self, version: PlatformVersion) -> bool {
        self.gate.map_or(true, |gate| gate.allows(version))
    }

    pub fn into_descriptor(self, scale_factor: f64) -> Result<TestSuiteDescriptor> {
        TestSuiteDescriptor::new(
            self.short_name,
            self.launch_target,
            scale_factor * self.scale_multiplier,
            self.env_axes,
            self.cli_axes,
        )
    }
}

/// One test ready for expansion and submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSuiteDescriptor {
    short_name: String,
    launch_target: String,
    scale_factor: f64,
    env_axes: Vec<OptionAxis>,
    cli_axes: Vec<OptionAxis>,
}

/// One launch: system properties plus command-line arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRun {
    pub env: ArgumentList,
    pub args: ArgumentList,
}

impl TestSuiteDescriptor {
    pub fn new(
        short_name: impl Into<String>,
        launch_target: impl Into<String>,
        scale_factor: f64,
        env_axes: Vec<OptionAxis>,
        cli_axes: Vec<OptionAxis>,
    ) -> Result<Self> {
        let short_name = short_name.into();
        if short_name.trim().is_empty() {
            return Err(PerfError::Config("test short name must not be empty".to_string()));
        }

        Ok(Self {
            short_name,
            launch_target: launch_target.into(),
            scale_factor: validate_scale_factor(scale_factor)?,
            env_axes,
            cli_axes,
        })
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn launch_target(&self) -> &str {
        &self.launch_target
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn env_axes(&self) -> &[OptionAxis] {
        &self.env_axes
    }

    pub fn cli_axes(&self) -> &[OptionAxis] {
        &self.cli_axes
    }

    pub fn expand_cli(&self) -> Result<ExpansionResult> {
        expander::expand(&self.cli_axes, self.scale_factor)
    }

    pub fn expand_env(&self) -> Result<ExpansionResult> {
        expander::expand(&self.env_axes, self.scale_factor)
    }

    /// Every launch of this test: the product of the system-property
    /// expansion and the argument expansion, system properties varying slowest.
    pub fn resolved_runs(&self) -> Result<Vec<ResolvedRun>> {
        let env_rows = self.expand_env()?;
        let cli_rows = self.expand_cli()?;

        let mut runs = Vec::with_capacity(env_rows.len() * cli_rows.len());
        for env in env_rows.iter() {
            for args in cli_rows.iter() {
                runs.push(ResolvedRun {
                    env: env.clone(),
                    args: args.clone(),
                });
            }
        }
        Ok(runs)
    }
}

/// A named group of related tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suite {
    pub kind: SuiteKind,
    pub tests: Vec<TestSuiteDescriptor>,
}

impl Suite {
    pub fn find(&self, short_name: &str) -> impl Iterator<Item = &TestSuiteDescriptor> + '_ {
        let short_name = short_name.to_string();
        self.tests.iter().filter(move |t| t.short_name == short_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkperf_common::values;

    #[test]
    fn test_suite_kind_parsing() {
        assert_eq!("mllib".parse::<SuiteKind>().unwrap(), SuiteKind::Mllib);
        assert_eq!("python_mllib".parse::<SuiteKind>().unwrap(), SuiteKind::PythonMllib);
        assert_eq!("PySpark".parse::<SuiteKind>().unwrap(), SuiteKind::PySpark);
        assert!(matches!(
            "graphx".parse::<SuiteKind>(),
            Err(PerfError::UnknownSuite(_))
        ));
    }

    #[test]
    fn test_suite_selection() {
        let selection = SuiteSelection::default();
        assert!(SuiteKind::Mllib.is_enabled(&selection));
        assert!(!SuiteKind::Spark.is_enabled(&selection));
        assert!(SuiteKind::PythonMllib.needs_prep(&selection));
    }

    #[test]
    fn test_descriptor_validation() {
        let err = TestSuiteDescriptor::new("kmeans", "mllib.perf.TestRunner", 0.0, vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, PerfError::NonPositiveScaleFactor(_)));

        assert!(TestSuiteDescriptor::new(" ", "x", 1.0, vec![], vec![]).is_err());
    }

    #[test]
    fn test_declaration_scale_multiplier() {
        let declaration = TestDeclaration::new(
            "python-sort-by-key",
            "core_tests.py",
            vec![],
            vec![OptionAxis::scalable("num-records", values![200]).unwrap()],
        )
        .with_scale(0.1);

        let descriptor = declaration.into_descriptor(0.5).unwrap();
        assert!((descriptor.scale_factor() - 0.05).abs() < 1e-12);
        assert_eq!(
            descriptor.expand_cli().unwrap().rows(),
            &[vec!["--num-records", "10"]]
        );
    }

    #[test]
    fn test_resolved_runs() {
        let descriptor = TestSuiteDescriptor::new(
            "agg",
            "spark.perf.TestRunner",
            1.0,
            vec![OptionAxis::system_property("spark.shuffle.manager", values!["SORT", "HASH"]).unwrap()],
            vec![
                OptionAxis::constant("aggregate-by-key").unwrap(),
                OptionAxis::flag_value("reduce-tasks", values![10, 20]).unwrap(),
            ],
        )
        .unwrap();

        let runs = descriptor.resolved_runs().unwrap();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0].env, vec!["-Dspark.shuffle.manager=SORT"]);
        assert_eq!(runs[1].args, vec!["aggregate-by-key", "--reduce-tasks", "20"]);
        assert_eq!(runs[2].env, vec!["-Dspark.shuffle.manager=HASH"]);
    }
}
