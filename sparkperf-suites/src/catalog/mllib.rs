//! MLlib algorithm tests
//!
//! Defaults suit a 16-node m3.2xlarge cluster. Several option lists and
//! tests only exist from a given platform version on; the lists are resolved
//! through [`VersionedAxes`] and the tests carry a [`VersionGate`].

use sparkperf_common::{values, PlatformVersion, Result};

use super::{common, flag, java, opt, scaled, test_args, CatalogContext};
use crate::option::OptionAxis;
use crate::registry::{VersionGate, VersionedAxes};
use crate::suite::{SuiteKind, TestDeclaration};

fn with(mut base: Vec<OptionAxis>, extra: Vec<OptionAxis>) -> Vec<OptionAxis> {
    base.extend(extra);
    base
}

pub(super) fn java_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    let axes = VersionedAxes::new(common::java_opts()?).gated(
        VersionGate::at_least(1, 1),
        // SORT or HASH
        vec![java("spark.shuffle.manager", values!["SORT"])?],
    );
    Ok(axes.resolve(version))
}

fn mllib_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        common::opts()?,
        vec![
            scaled("num-partitions", values![128])?,
            opt("random-seed", values![5])?,
        ],
    ))
}

fn regression_classification_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(mllib_opts()?, vec![scaled("num-examples", values![100000])?]))
}

fn glm_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    let axes = VersionedAxes::new(with(
        regression_classification_opts()?,
        vec![
            opt("num-features", values![10000])?,
            // SGD
            opt("num-iterations", values![20])?,
            opt("step-size", values![0.001])?,
            // none, l1 or l2
            opt("reg-type", values!["l2"])?,
            opt("reg-param", values![0.1])?,
        ],
    ))
    // Ignored by the tests but required by their argument parser
    .gated(VersionGate::at_least(1, 5), vec![opt("elastic-net-param", values![0.0])?])
    .gated(VersionGate::below(2, 0), vec![opt("feature-noise", values![1.0])?]);
    Ok(axes.resolve(version))
}

pub(super) fn glm_regression_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    Ok(with(
        glm_opts(version)?,
        vec![
            opt("optimizer", values!["sgd"])?,
            opt("intercept", values![0.0])?,
            opt("label-noise", values![0.1])?,
            // Squared error
            opt("loss", values!["l2"])?,
        ],
    ))
}

fn classification_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    Ok(with(
        glm_opts(version)?,
        vec![
            // Expected fraction of negative examples
            opt("per-negative", values![0.3])?,
            opt("optimizer", values!["sgd", "l-bfgs"])?,
        ],
    ))
}

pub(super) fn glm_classification_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    // logistic or hinge
    Ok(with(classification_opts(version)?, vec![opt("loss", values!["logistic"])?]))
}

fn elastic_net_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        regression_classification_opts()?,
        vec![
            // Upper bound for LBFGS/OWLQN
            opt("num-iterations", values![20])?,
            opt("optimizer", values!["auto"])?,
            opt("reg-type", values!["elastic-net"])?,
            // Pure L2, then pure L1
            opt("elastic-net-param", values![0.0, 1.0])?,
            opt("reg-param", values![0.01])?,
            opt("feature-noise", values![1.0])?,
            // Unused by LBFGS but checked
            opt("step-size", values![0.0])?,
        ],
    ))
}

fn elastic_net_regression_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        elastic_net_opts()?,
        vec![
            opt("label-noise", values![0.1])?,
            opt("intercept", values![0.2])?,
            opt("loss", values!["l2"])?,
        ],
    ))
}

fn elastic_net_classification_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        elastic_net_opts()?,
        vec![
            opt("per-negative", values![0.3])?,
            // Only logistic loss supports elastic-net
            opt("loss", values!["logistic"])?,
        ],
    ))
}

pub(super) fn naive_bayes_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        regression_classification_opts()?,
        vec![
            opt("num-features", values![10000])?,
            opt("per-negative", values![0.3])?,
            // Smoothing lambda
            opt("nb-lambda", values![1.0])?,
            // bernoulli needs 1.4
            opt("model-type", values!["multinomial"])?,
        ],
    ))
}

fn decision_tree_opts(version: PlatformVersion) -> Result<Vec<OptionAxis>> {
    let base = with(
        mllib_opts()?,
        vec![
            scaled("num-examples", values![100000])?,
            opt("num-features", values![500])?,
            // 0 is regression, 2+ is classification with that many classes
            opt("label-type", values![0, 2])?,
            opt("frac-categorical-features", values![0.5])?,
            // Non-binary categorical features have 20 categories
            opt("frac-binary-features", values![0.5])?,
            // Depth N on 1.0 is depth N-1 from 1.1 on
            opt("tree-depth", values![5, 10])?,
            opt("max-bins", values![32])?,
        ],
    );

    let mut ensemble_types = vec!["RandomForest"];
    if version >= PlatformVersion::new(1, 3) {
        ensemble_types.push("GradientBoostedTrees");
    }
    if version >= PlatformVersion::new(1, 4) {
        ensemble_types.extend(["ml.RandomForest", "ml.GradientBoostedTrees"]);
    }

    let axes = VersionedAxes::new(base).gated(
        VersionGate::at_least(1, 2),
        vec![
            opt("ensemble-type", ensemble_types.into_iter().map(Into::into).collect())?,
            // Empty means synthetic data
            opt("training-data", values![""])?,
            // Empty holds out part of the training data
            opt("test-data", values![""])?,
            opt("test-data-fraction", values![0.2])?,
            // 1 runs a single decision tree
            opt("num-trees", values![1, 10])?,
            // auto, all, sqrt, log2 or onethird
            opt("feature-subset-strategy", values!["auto"])?,
        ],
    );
    Ok(axes.resolve(version))
}

pub(super) fn recommendation_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-users", values![600000])?,
            opt("num-products", values![500000])?,
            scaled("num-ratings", values![10000])?,
            // ALS
            opt("num-iterations", values![10])?,
            opt("rank", values![10])?,
            opt("reg-param", values![0.1])?,
            flag("implicit-prefs", false)?,
        ],
    ))
}

pub(super) fn clustering_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-examples", values![100000])?,
            opt("num-features", values![10000])?,
            opt("num-centers", values![20])?,
            opt("num-iterations", values![20])?,
        ],
    ))
}

fn gmm_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-examples", values![100000])?,
            opt("num-features", values![100])?,
            opt("num-centers", values![20])?,
            opt("num-iterations", values![20])?,
        ],
    ))
}

fn lda_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-documents", values![50000])?,
            opt("num-vocab", values![10000])?,
            opt("num-topics", values![20])?,
            opt("num-iterations", values![20])?,
            opt("document-length", values![100])?,
            opt("optimizer", values!["em", "online"])?,
        ],
    ))
}

fn pic_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-examples", values![100000])?,
            opt("node-degree", values![20])?,
            opt("num-centers", values![40])?,
            opt("num-iterations", values![20])?,
        ],
    ))
}

/// Matrix of `rows` scalable rows and `cols` fixed columns
fn matrix_opts(rows: i64, cols: i64) -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-rows", values![rows])?,
            opt("num-cols", values![cols])?,
        ],
    ))
}

fn linalg_opts(cols: i64, rank: i64) -> Result<Vec<OptionAxis>> {
    // rank is the number of top singular values for SVD and PCA
    Ok(with(matrix_opts(1000000, cols)?, vec![opt("rank", values![rank])?]))
}

fn block_matrix_mult_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("m", values![20000])?,
            opt("k", values![10000])?,
            opt("n", values![10000])?,
            opt("block-size", values![1024])?,
        ],
    ))
}

pub(super) fn pearson_opts() -> Result<Vec<OptionAxis>> {
    matrix_opts(1000000, 1000)
}

pub(super) fn spearman_opts() -> Result<Vec<OptionAxis>> {
    matrix_opts(1000000, 100)
}

fn word2vec_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-sentences", values![1000000])?,
            opt("num-words", values![10000])?,
            opt("vector-size", values![100])?,
            opt("num-iterations", values![3])?,
            opt("min-count", values![5])?,
        ],
    ))
}

fn fp_growth_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-baskets", values![5000000])?,
            opt("avg-basket-size", values![10])?,
            opt("num-items", values![1000])?,
            opt("min-support", values![0.01])?,
        ],
    ))
}

fn prefix_span_opts() -> Result<Vec<OptionAxis>> {
    Ok(with(
        mllib_opts()?,
        vec![
            scaled("num-sequences", values![5000000])?,
            opt("avg-sequence-size", values![5])?,
            opt("avg-itemset-size", values![2])?,
            opt("num-items", values![500])?,
            opt("min-support", values![0.5])?,
            opt("max-pattern-len", values![10])?,
            opt("max-local-proj-db-size", values![32000000])?,
        ],
    ))
}

pub(super) fn tests(ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let version = ctx.mllib_version;
    let java_opts = java_opts(version)?;
    let test = |name: &str, axes: Vec<OptionAxis>| -> Result<TestDeclaration> {
        Ok(TestDeclaration::new(
            name,
            SuiteKind::Mllib.default_launch_target(),
            java_opts.clone(),
            test_args(name, &[axes])?,
        ))
    };

    let since = VersionGate::at_least;
    let num_features = |n: i64| opt("num-features", values![n]);

    Ok(vec![
        test("glm-regression", glm_regression_opts(version)?)?,
        test("glm-classification", glm_classification_opts(version)?)?,
        // LBFGS, then the normal equation solver
        test("glm-regression", with(elastic_net_regression_opts()?, vec![num_features(10000)?]))?
            .with_gate(since(1, 5)),
        test("glm-regression", with(elastic_net_regression_opts()?, vec![num_features(200)?]))?
            .with_gate(since(1, 5)),
        test("glm-classification", with(elastic_net_classification_opts()?, vec![num_features(10000)?]))?
            .with_gate(since(1, 5)),
        test("glm-classification", with(elastic_net_classification_opts()?, vec![num_features(200)?]))?
            .with_gate(since(1, 5)),
        test("naive-bayes", naive_bayes_opts()?)?,
        test("decision-tree", decision_tree_opts(version)?)?,
        test("als", recommendation_opts()?)?,
        test("kmeans", clustering_opts()?)?,
        test("gmm", gmm_opts()?)?.with_gate(since(1, 3)),
        test("lda", lda_opts()?)?.with_gate(since(1, 4)),
        test("pic", pic_opts()?)?.with_gate(since(1, 3)),
        test("svd", linalg_opts(500, 10)?)?,
        test("pca", linalg_opts(1000, 50)?)?,
        test("summary-statistics", linalg_opts(500, 10)?)?,
        test("block-matrix-mult", block_matrix_mult_opts()?)?.with_gate(since(1, 3)),
        test("pearson", pearson_opts()?)?.with_gate(since(1, 1)),
        test("spearman", spearman_opts()?)?.with_gate(since(1, 1)),
        test("chi-sq-feature", matrix_opts(2000000, 500)?)?.with_gate(since(1, 1)),
        test("chi-sq-gof", matrix_opts(50000000, 0)?)?.with_gate(since(1, 1)),
        test("chi-sq-mat", matrix_opts(20000, 0)?)?.with_gate(since(1, 1)),
        test("word2vec", word2vec_opts()?)?.with_gate(since(1, 3)),
        test("fp-growth", fp_growth_opts()?)?.with_gate(since(1, 3)),
        test("prefix-span", prefix_span_opts()?)?.with_gate(since(1, 5)),
    ])
}
