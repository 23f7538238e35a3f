//! Core engine tests, Scala driver

use sparkperf_common::{values, Result};

use super::{common, opt, test_args, CatalogContext};
use crate::suite::{SuiteKind, TestDeclaration};

fn scheduling_throughput_opts() -> Result<Vec<crate::option::OptionAxis>> {
    Ok(vec![
        // Tasks launched in each job
        opt("num-tasks", values![10 * 1000])?,
        opt("num-jobs", values![1])?,
        // Size of the task closure in bytes
        opt("closure-size", values![0])?,
        opt("random-seed", values![5])?,
    ])
}

pub(super) fn tests(_ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let runner = SuiteKind::Spark.default_launch_target();
    let java_opts = common::java_opts()?;

    Ok(vec![TestDeclaration::new(
        "scheduling-throughput",
        runner,
        java_opts,
        test_args(
            "scheduling-throughput",
            &[&common::opts()?, &scheduling_throughput_opts()?],
        )?,
    )])
}
