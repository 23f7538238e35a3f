//! Option lists shared across suites

use sparkperf_common::{values, Result};

use super::{flag, java, opt, scaled};
use crate::option::OptionAxis;

pub(super) fn java_opts() -> Result<Vec<OptionAxis>> {
    Ok(vec![
        // Fraction of JVM memory used for caching RDDs
        java("spark.storage.memoryFraction", values![0.66])?,
        java("spark.serializer", values!["org.apache.spark.serializer.JavaSerializer"])?,
        // Disable delay scheduling for consistency across runs
        java("spark.locality.wait", values![(60 * 1000 * 1000).to_string()])?,
    ])
}

/// Shared by every test
pub(super) fn opts() -> Result<Vec<OptionAxis>> {
    Ok(vec![
        // Repetitions of each experiment; a single value only makes sense here
        opt("num-trials", values![10])?,
        // Pause between trials in seconds, lets the buffer cache write back
        opt("inter-trial-wait", values![3])?,
    ])
}

/// Shared by the key-value tests of the core engine
pub(super) fn key_val_opts(hdfs_url: &str) -> Result<Vec<OptionAxis>> {
    Ok(vec![
        scaled("num-partitions", values![400])?,
        scaled("reduce-tasks", values![400])?,
        opt("random-seed", values![5])?,
        // memory, disk or hdfs. hdfs inputs are reused across runs
        opt("persistent-type", values!["memory"])?,
        flag("wait-for-exit", false)?,
        scaled("num-records", values![200 * 1000 * 1000])?,
        scaled("unique-keys", values![20 * 1000])?,
        opt("key-length", values![10])?,
        scaled("unique-values", values![1000 * 1000])?,
        opt("value-length", values![10])?,
        // Hashes instead of padded numbers for keys and values
        flag("hash-records", false)?,
        opt("storage-location", values![format!("{}/spark-perf-kv-data", hdfs_url)])?,
        opt("skew", values![2])?,
    ])
}

/// Common options followed by the key-value options
pub(super) fn kv_test_opts(hdfs_url: &str) -> Result<Vec<OptionAxis>> {
    let mut axes = opts()?;
    axes.extend(key_val_opts(hdfs_url)?);
    Ok(axes)
}
