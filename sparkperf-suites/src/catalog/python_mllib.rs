//! MLlib tests driven from Python

use sparkperf_common::Result;

use super::{mllib, test_args, CatalogContext};
use crate::registry::VersionGate;
use crate::suite::{SuiteKind, TestDeclaration};

pub(super) fn tests(ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let version = ctx.mllib_version;
    let script = SuiteKind::PythonMllib.default_launch_target();
    let java_opts = mllib::java_opts(version)?;

    let declared = [
        ("python-glm-classification", "GLMClassificationTest", mllib::glm_classification_opts(version)?, None),
        ("python-glm-regression", "GLMRegressionTest", mllib::glm_regression_opts(version)?, None),
        ("python-naive-bayes", "NaiveBayesTest", mllib::naive_bayes_opts()?, None),
        ("python-als", "ALSTest", mllib::recommendation_opts()?, None),
        ("python-kmeans", "KMeansTest", mllib::clustering_opts()?, None),
        (
            "python-pearson",
            "PearsonCorrelationTest",
            mllib::pearson_opts()?,
            Some(VersionGate::at_least(1, 1)),
        ),
        (
            "python-spearman",
            "SpearmanCorrelationTest",
            mllib::spearman_opts()?,
            Some(VersionGate::at_least(1, 1)),
        ),
    ];

    declared
        .into_iter()
        .map(|(name, class, axes, gate)| -> Result<TestDeclaration> {
            let mut test = TestDeclaration::new(name, script, java_opts.clone(), test_args(class, &[axes])?);
            test.gate = gate;
            Ok(test)
        })
        .collect()
}
