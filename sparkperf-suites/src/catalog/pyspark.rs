//! Core engine tests, Python driver

use sparkperf_common::{values, Result};

use super::{common, opt, scaled, test_args, CatalogContext};
use crate::option::OptionAxis;
use crate::suite::{SuiteKind, TestDeclaration};

fn broadcast_opts() -> Result<Vec<OptionAxis>> {
    Ok(vec![scaled("broadcast-size", values![200 << 20])?])
}

pub(super) fn tests(ctx: &CatalogContext) -> Result<Vec<TestDeclaration>> {
    let runner = SuiteKind::PySpark.default_launch_target();
    let java_opts = common::java_opts()?;
    let kv = common::kv_test_opts(&ctx.hdfs_url)?;
    let broadcast = broadcast_opts()?;

    let kv_test = |name: &str, program: &str, multiplier: f64| -> Result<TestDeclaration> {
        Ok(TestDeclaration::new(name, runner, java_opts.clone(), test_args(program, &[&kv])?)
            .with_scale(multiplier))
    };

    let broadcast_test = |name: &str, program: &str| -> Result<TestDeclaration> {
        Ok(TestDeclaration::new(
            name,
            runner,
            java_opts.clone(),
            test_args(program, &[&kv, &broadcast])?,
        ))
    };

    Ok(vec![
        TestDeclaration::new(
            "python-scheduling-throughput",
            runner,
            java_opts.clone(),
            test_args(
                "SchedulerThroughputTest",
                &[vec![opt("num-tasks", values![5000])?], common::opts()?],
            )?,
        ),
        kv_test("python-agg-by-key", "AggregateByKey", 1.0)?,
        // Ints are smaller, so twice the input
        kv_test("python-agg-by-key-int", "AggregateByKeyInt", 2.0)?,
        kv_test("python-agg-by-key-naive", "AggregateByKeyNaive", 1.0)?,
        kv_test("python-sort-by-key", "SortByKey", 0.1)?,
        kv_test("python-sort-by-key-int", "SortByKeyInt", 0.2)?,
        kv_test("python-count", "Count", 1.0)?,
        kv_test("python-count-w-fltr", "CountWithFilter", 1.0)?,
        broadcast_test("python-broadcast-w-bytes", "BroadcastWithBytes")?,
        broadcast_test("python-broadcast-w-set", "BroadcastWithSet")?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkperf_common::PlatformVersion;

    fn ctx() -> CatalogContext {
        CatalogContext {
            hdfs_url: "hdfs://nn:9000/test/".to_string(),
            mllib_version: PlatformVersion::new(2, 0),
        }
    }

    fn arg_after<'a>(row: &'a [String], flag: &str) -> Option<&'a str> {
        row.iter()
            .position(|t| t == flag)
            .and_then(|i| row.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_sort_by_key_is_scaled_down() {
        let test = tests(&ctx())
            .unwrap()
            .into_iter()
            .find(|t| t.short_name == "python-sort-by-key")
            .unwrap();
        let descriptor = test.into_descriptor(1.0).unwrap();
        let rows = descriptor.expand_cli().unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows.rows()[0];
        assert_eq!(row[0], "SortByKey");
        assert_eq!(arg_after(row, "--num-records"), Some("20000000"));
        assert_eq!(arg_after(row, "--num-partitions"), Some("40"));
        assert_eq!(arg_after(row, "--key-length"), Some("10"));
        assert_eq!(
            arg_after(row, "--storage-location"),
            Some("hdfs://nn:9000/test//spark-perf-kv-data")
        );
        // Boolean flags set to false vanish
        assert!(!row.iter().any(|t| t == "--wait-for-exit" || t == "--hash-records"));
    }

    #[test]
    fn test_scheduling_throughput_overrides_come_first() {
        let test = tests(&ctx()).unwrap().remove(0);
        let row = test.into_descriptor(1.0).unwrap().expand_cli().unwrap().into_rows().remove(0);
        assert_eq!(
            row,
            vec!["SchedulerThroughputTest", "--num-tasks", "5000", "--num-trials", "10", "--inter-trial-wait", "3"]
        );
    }

    #[test]
    fn test_broadcast_size_scales() {
        let test = tests(&ctx())
            .unwrap()
            .into_iter()
            .find(|t| t.short_name == "python-broadcast-w-set")
            .unwrap();
        let row = test.into_descriptor(0.5).unwrap().expand_cli().unwrap().into_rows().remove(0);
        assert_eq!(arg_after(&row, "--broadcast-size"), Some("104857600"));
    }
}
