//! Streaming engine tests

use sparkperf_common::{values, Result};

use super::{java, opt, scaled, test_args, CatalogContext};
use crate::option::OptionAxis;
use crate::suite::{SuiteKind, TestDeclaration};

fn batch_duration(millis: i64) -> Result<Vec<OptionAxis>> {
    Ok(vec![opt("batch-duration", values![millis])?])
}

fn window_duration(millis: i64) -> Result<Vec<OptionAxis>> {
    Ok(vec![opt("window-duration", values![millis])?])
}

pub(super) fn java_opts() -> Result<Vec<OptionAxis>> {
    Ok(vec![
        java("spark.storage.memoryFraction", values![0.66])?,
        java("spark.serializer", values!["org.apache.spark.serializer.JavaSerializer"])?,
        java("spark.executor.extraJavaOptions", values![" -XX:+UseConcMarkSweepGC "])?,
    ])
}

fn streaming_opts(hdfs_url: &str) -> Result<Vec<OptionAxis>> {
    Ok(vec![
        opt("total-duration", values![60])?,
        opt("hdfs-url", values![hdfs_url])?,
    ])
}

fn key_val_opts(hdfs_url: &str) -> Result<Vec<OptionAxis>> {
    let mut axes = streaming_opts(hdfs_url)?;
    axes.extend(batch_duration(2000)?);
    axes.extend([
        // Input streams
        scaled("num-streams", values![1])?,
        // Records per second per input stream
        opt("records-per-sec", values![10 * 1000])?,
        scaled("reduce-tasks", values![10])?,
        opt("memory-serialization", values!["true"])?,
        scaled("unique-keys", values![100 * 1000])?,
        scaled("unique-values", values![1000 * 1000])?,
        // Send data through a receiver
        opt("use-receiver", values!["true"])?,
    ]);
    Ok(axes)
}

fn hdfs_recovery_opts(hdfs_url: &str) -> Result<Vec<OptionAxis>> {
    let mut axes = streaming_opts(hdfs_url)?;
    axes.extend(batch_duration(5000)?);
    axes.extend([
        opt("records-per-file", values![10000])?,
        opt("file-cleaner-delay", values![300])?,
    ]);
    Ok(axes)
}

pub(super) fn tests(ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let runner = SuiteKind::Streaming.default_launch_target();
    let java_opts = java_opts()?;
    let key_val = key_val_opts(&ctx.hdfs_url)?;
    let window = window_duration(10000)?;

    Ok(vec![
        // Checks the setup end to end
        TestDeclaration::new(
            "basic",
            runner,
            java_opts.clone(),
            test_args("basic", &[streaming_opts(&ctx.hdfs_url)?, batch_duration(1000)?])?,
        ),
        TestDeclaration::new(
            "state-by-key",
            runner,
            java_opts.clone(),
            test_args("state-by-key", &[&key_val])?,
        ),
        TestDeclaration::new(
            "group-by-key-and-window",
            runner,
            java_opts.clone(),
            test_args("group-by-key-and-window", &[&key_val, &window])?,
        ),
        TestDeclaration::new(
            "reduce-by-key-and-window",
            runner,
            java_opts.clone(),
            test_args("reduce-by-key-and-window", &[&key_val, &window])?,
        ),
        TestDeclaration::new(
            "hdfs-recovery",
            runner,
            java_opts,
            test_args("hdfs-recovery", &[hdfs_recovery_opts(&ctx.hdfs_url)?])?,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkperf_common::PlatformVersion;

    #[test]
    fn test_basic_args() {
        let ctx = CatalogContext {
            hdfs_url: "hdfs://nn:9000/test/".to_string(),
            mllib_version: PlatformVersion::new(2, 0),
        };
        let basic = tests(&ctx).unwrap().remove(0);
        let rows = basic.into_descriptor(0.05).unwrap().expand_cli().unwrap();
        assert_eq!(
            rows.rows(),
            &[vec![
                "basic",
                "--total-duration", "60",
                "--hdfs-url", "hdfs://nn:9000/test/",
                "--batch-duration", "1000",
            ]]
        );
    }

    #[test]
    fn test_window_tests_scale() {
        let ctx = CatalogContext {
            hdfs_url: "hdfs://nn:9000/test/".to_string(),
            mllib_version: PlatformVersion::new(2, 0),
        };
        let window = tests(&ctx)
            .unwrap()
            .into_iter()
            .find(|t| t.short_name == "reduce-by-key-and-window")
            .unwrap();
        let row = window
            .into_descriptor(0.05)
            .unwrap()
            .expand_cli()
            .unwrap()
            .into_rows()
            .remove(0);

        let joined = row.join(" ");
        // One stream never scales below one
        assert!(joined.contains("--num-streams 1 "));
        assert!(joined.contains("--unique-keys 5000 "));
        assert!(joined.ends_with("--window-duration 10000"));
    }
}
