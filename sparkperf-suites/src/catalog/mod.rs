//! Built-in benchmark declarations for every suite
//!
//! The default values suit roughly 20 m1.xlarge nodes (15 GB each); the
//! global scale factor adapts size-related axes to other clusters. Shared
//! option lists come first in each test and per-test overrides after, relying
//! on the expander's last-wins dedupe.

mod common;
mod mllib;
mod pyspark;
mod python_mllib;
mod spark;
mod streaming;

use sparkperf_common::{ExtraTestSpec, PerfConfig, PlatformVersion, Result, ScalarValue};
use tracing::{debug, info};

use crate::option::OptionAxis;
use crate::suite::{Suite, SuiteKind, TestDeclaration, TestSuiteDescriptor};

/// Inputs the declarations depend on
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogContext {
    pub hdfs_url: String,
    pub mllib_version: PlatformVersion,
}

impl CatalogContext {
    pub fn from_config(config: &PerfConfig) -> Self {
        Self {
            hdfs_url: config.cluster.hdfs_url(),
            mllib_version: config.tests.mllib_version,
        }
    }
}

/// Every declared test of one suite, version gates already applied.
pub fn declarations(kind: SuiteKind, ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let declared = match kind {
        SuiteKind::Spark => spark::tests(ctx)?,
        SuiteKind::PySpark => pyspark::tests(ctx)?,
        SuiteKind::Streaming => streaming::tests(ctx)?,
        SuiteKind::Mllib => mllib::tests(ctx)?,
        SuiteKind::PythonMllib => python_mllib::tests(ctx)?,
    };

    Ok(declared
        .into_iter()
        .filter(|t| t.is_declared_for(ctx.mllib_version))
        .collect())
}

/// Common system properties of a suite, used by extra tests that inherit them.
pub fn common_env_axes(kind: SuiteKind, ctx: &CatalogContext) -> Result<Vec<OptionAxis>> {
    match kind {
        SuiteKind::Spark | SuiteKind::PySpark => common::java_opts(),
        SuiteKind::Streaming => streaming::java_opts(),
        SuiteKind::Mllib | SuiteKind::PythonMllib => mllib::java_opts(ctx.mllib_version),
    }
}

/// Turn a configuration-file test into a declaration, validating its axes.
pub fn extra_declaration(spec: &ExtraTestSpec, ctx: &CatalogContext) -> Result<(SuiteKind, TestDeclaration)> {
    let kind: SuiteKind = spec.suite.parse()?;

    let mut env_axes = if spec.inherit_env {
        common_env_axes(kind, ctx)?
    } else {
        Vec::new()
    };
    for axis in &spec.env_axes {
        env_axes.push(OptionAxis::try_from(axis)?);
    }

    let cli_axes = spec
        .cli_axes
        .iter()
        .map(OptionAxis::try_from)
        .collect::<Result<Vec<_>>>()?;

    let launch_target = spec
        .launch_target
        .clone()
        .unwrap_or_else(|| kind.default_launch_target().to_string());

    let declaration = TestDeclaration::new(spec.short_name.clone(), launch_target, env_axes, cli_axes)
        .with_scale(spec.scale_multiplier);
    Ok((kind, declaration))
}

/// Descriptors for a set of suites, built once from the configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    suites: Vec<Suite>,
}

impl Catalog {
    /// The suites the configuration enables, plus its extra tests.
    pub fn build(config: &PerfConfig) -> Result<Self> {
        let kinds: Vec<SuiteKind> = SuiteKind::ALL
            .into_iter()
            .filter(|kind| kind.is_enabled(&config.suites))
            .collect();
        Self::build_for(config, &kinds)
    }

    /// Every suite regardless of the run selection.
    pub fn build_all(config: &PerfConfig) -> Result<Self> {
        Self::build_for(config, &SuiteKind::ALL)
    }

    pub fn build_for(config: &PerfConfig, kinds: &[SuiteKind]) -> Result<Self> {
        config.validate()?;
        let ctx = CatalogContext::from_config(config);
        let scale_factor = config.tests.scale_factor;

        let mut suites = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let mut declared = declarations(kind, &ctx)?;
            for spec in &config.extra_tests {
                let (extra_kind, declaration) = extra_declaration(spec, &ctx)?;
                if extra_kind == kind {
                    debug!("Adding extra test {} to {}", declaration.short_name, kind);
                    declared.push(declaration);
                }
            }

            let tests = declared
                .into_iter()
                .map(|d| d.into_descriptor(scale_factor))
                .collect::<Result<Vec<TestSuiteDescriptor>>>()?;

            info!("Loaded {} {} tests", tests.len(), kind);
            suites.push(Suite { kind, tests });
        }

        Ok(Self { suites })
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn suite(&self, kind: SuiteKind) -> Option<&Suite> {
        self.suites.iter().find(|s| s.kind == kind)
    }

    /// All tests with their suite, in declaration order.
    pub fn tests(&self) -> impl Iterator<Item = (SuiteKind, &TestSuiteDescriptor)> + '_ {
        self.suites
            .iter()
            .flat_map(|suite| suite.tests.iter().map(move |t| (suite.kind, t)))
    }

    pub fn total_tests(&self) -> usize {
        self.suites.iter().map(|s| s.tests.len()).sum()
    }
}

// Declaration helpers shared by the suite modules

fn opt(name: &str, values: Vec<ScalarValue>) -> Result<OptionAxis> {
    OptionAxis::flag_value(name, values)
}

fn scaled(name: &str, values: Vec<ScalarValue>) -> Result<OptionAxis> {
    OptionAxis::scalable(name, values)
}

fn flag(name: &str, enabled: bool) -> Result<OptionAxis> {
    OptionAxis::boolean_flag(name, enabled)
}

fn constant(literal: &str) -> Result<OptionAxis> {
    OptionAxis::constant(literal)
}

fn java(name: &str, values: Vec<ScalarValue>) -> Result<OptionAxis> {
    OptionAxis::system_property(name, values)
}

/// `[constant] + lists...`, the shape of every test's argument list
fn test_args<L: AsRef<[OptionAxis]>>(program: &str, lists: &[L]) -> Result<Vec<OptionAxis>> {
    let mut axes = vec![constant(program)?];
    for list in lists {
        axes.extend(list.as_ref().iter().cloned());
    }
    Ok(axes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkperf_common::{AxisSpec, RenderKind, SuiteSelection};

    fn config_with_version(major: u32, minor: u32) -> PerfConfig {
        let mut config = PerfConfig::default();
        config.tests.mllib_version = PlatformVersion::new(major, minor);
        config.suites = SuiteSelection::all();
        config
    }

    fn names(catalog: &Catalog, kind: SuiteKind) -> Vec<String> {
        catalog
            .suite(kind)
            .map(|s| s.tests.iter().map(|t| t.short_name().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_default_build_only_enabled_suites() {
        let catalog = Catalog::build(&PerfConfig::default()).unwrap();
        assert_eq!(catalog.suites().len(), 1);
        assert!(catalog.suite(SuiteKind::Mllib).is_some());
        assert!(catalog.suite(SuiteKind::Spark).is_none());
    }

    #[test]
    fn test_suite_sizes_at_2_0() {
        let catalog = Catalog::build(&config_with_version(2, 0)).unwrap();
        assert_eq!(names(&catalog, SuiteKind::Spark), vec!["scheduling-throughput"]);
        assert_eq!(names(&catalog, SuiteKind::PySpark).len(), 10);
        assert_eq!(names(&catalog, SuiteKind::Streaming).len(), 5);
        assert_eq!(names(&catalog, SuiteKind::Mllib).len(), 25);
        assert_eq!(names(&catalog, SuiteKind::PythonMllib).len(), 7);
        assert_eq!(catalog.total_tests(), 48);
    }

    #[test]
    fn test_mllib_gates_at_1_0() {
        let catalog = Catalog::build(&config_with_version(1, 0)).unwrap();
        assert_eq!(
            names(&catalog, SuiteKind::Mllib),
            vec![
                "glm-regression",
                "glm-classification",
                "naive-bayes",
                "decision-tree",
                "als",
                "kmeans",
                "svd",
                "pca",
                "summary-statistics",
            ]
        );
        assert_eq!(names(&catalog, SuiteKind::PythonMllib).len(), 5);
    }

    #[test]
    fn test_every_test_expands() {
        for version in [(1, 0), (1, 3), (1, 5), (2, 0)] {
            let catalog = Catalog::build(&config_with_version(version.0, version.1)).unwrap();
            for (kind, test) in catalog.tests() {
                let runs = test.resolved_runs().unwrap();
                assert!(!runs.is_empty(), "{} {} produced no runs", kind, test.short_name());
                // Every built-in test starts with the program-variant constant
                assert!(runs.iter().all(|run| !run.args.is_empty()));
            }
        }
    }

    #[test]
    fn test_extra_tests_join_their_suite() {
        let mut config = PerfConfig::default();
        config.extra_tests.push(ExtraTestSpec {
            suite: "mllib".to_string(),
            short_name: "kmeans-large".to_string(),
            launch_target: None,
            scale_multiplier: 2.0,
            inherit_env: true,
            env_axes: vec![],
            cli_axes: vec![
                AxisSpec {
                    kind: RenderKind::Constant,
                    name: "kmeans".to_string(),
                    values: vec![],
                    scalable: false,
                },
                AxisSpec {
                    kind: RenderKind::FlagValue,
                    name: "num-examples".to_string(),
                    values: vec![ScalarValue::Int(1000)],
                    scalable: true,
                },
            ],
        });

        let catalog = Catalog::build(&config).unwrap();
        let suite = catalog.suite(SuiteKind::Mllib).unwrap();
        let extra = suite.find("kmeans-large").next().unwrap();
        assert_eq!(extra.launch_target(), "mllib.perf.TestRunner");
        assert!((extra.scale_factor() - 0.1).abs() < 1e-12);
        assert!(!extra.env_axes().is_empty());
        assert_eq!(
            extra.expand_cli().unwrap().rows(),
            &[vec!["kmeans", "--num-examples", "100"]]
        );
    }

    #[test]
    fn test_invalid_extra_test_fails_build() {
        let mut config = PerfConfig::default();
        config.extra_tests.push(ExtraTestSpec {
            suite: "graphx".to_string(),
            short_name: "pagerank".to_string(),
            launch_target: None,
            scale_multiplier: 1.0,
            inherit_env: false,
            env_axes: vec![],
            cli_axes: vec![],
        });
        assert!(Catalog::build(&config).is_err());
    }
}
