use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const ENV_VARS: [&str; 6] = [
    "SPARK_HOME",
    "SPARKPERF_CLUSTER_URL",
    "SPARKPERF_SCALE_FACTOR",
    "SPARKPERF_HDFS_URL",
    "SPARKPERF_COMMIT_ID",
    "SPARKPERF_MLLIB_VERSION",
];

fn sparkperf() -> Command {
    let mut cmd = Command::cargo_bin("sparkperf").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("SPARKPERF_HDFS_URL", "hdfs://namenode:9000/test/");
    cmd
}

#[test]
fn test_list_default_suites() {
    sparkperf()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mllib"))
        .stdout(predicate::str::contains("glm-regression"))
        .stdout(predicate::str::contains("scheduling-throughput").not());
}

#[test]
fn test_list_all_as_json() {
    let output = sparkperf()
        .args(["list", "--all", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tests = report["tests"].as_array().unwrap();
    assert_eq!(tests.len(), 48);
    assert_eq!(tests[0]["suite"], "spark");
    assert_eq!(tests[0]["short_name"], "scheduling-throughput");
}

#[test]
fn test_expand_spark_suite() {
    sparkperf()
        .args(["expand", "--suite", "spark"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "scheduling-throughput --num-trials 10 --inter-trial-wait 3 --num-tasks 10000",
        ))
        .stdout(predicate::str::contains("-Dspark.storage.memoryFraction=0.66"));
}

#[test]
fn test_expand_scale_factor_override() {
    sparkperf()
        .args(["expand", "--suite", "pyspark", "--test", "python-sort-by-key", "--scale-factor", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--num-records 20000000"))
        .stdout(predicate::str::contains("hdfs://namenode:9000/test//spark-perf-kv-data"));
}

#[test]
fn test_expand_rejects_bad_scale_factor() {
    sparkperf()
        .args(["expand", "--suite", "spark", "--scale-factor", "0"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_suite_fails() {
    sparkperf()
        .args(["list", "--suite", "graphx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("graphx"));
}

#[test]
fn test_output_names_use_commit_id() {
    sparkperf()
        .env("SPARKPERF_COMMIT_ID", "origin/master")
        .args(["output-names", "--suite", "pyspark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python_perf_output_origin-master_"));
}

#[test]
fn test_config_generate_and_validate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sparkperf.toml");

    sparkperf()
        .args(["config", "generate", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    sparkperf()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_file_drives_selection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sparkperf.toml");
    std::fs::write(
        &path,
        r#"
[suites]
run_mllib = false
run_streaming = true

[tests]
scale_factor = 1.0
"#,
    )
    .unwrap();

    sparkperf()
        .arg("--config")
        .arg(&path)
        .args(["expand", "--test", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic --total-duration 60"));
}

#[test]
fn test_config_validate_rejects_bad_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[tests]\nscale_factor = -1.0\n").unwrap();

    sparkperf()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .failure();
}

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("sparkperf.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_config_validate_checks_extra_tests() {
    let dir = tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[[extra_tests]]
suite = "graphx"
short_name = "pagerank"
"#,
    );
    sparkperf()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("graphx"));

    let path = write_config(
        &dir,
        r#"
[[extra_tests]]
suite = "mllib"
short_name = "kmeans-empty"

[[extra_tests.cli_axes]]
kind = "flag-value"
name = "num-examples"
values = []
"#,
    );
    sparkperf()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("num-examples"));
}

const CONFLICTING_EXTRA_TEST: &str = r#"
[[extra_tests]]
suite = "spark"
short_name = "hash-records-clash"

[[extra_tests.cli_axes]]
kind = "flag-value"
name = "hash-records"
values = [1]

[[extra_tests.cli_axes]]
kind = "boolean-flag"
name = "hash-records"
values = [true]
"#;

#[test]
fn test_expand_halts_on_failing_test() {
    let dir = tempdir().unwrap();
    let path = write_config(&dir, CONFLICTING_EXTRA_TEST);

    sparkperf()
        .arg("--config")
        .arg(&path)
        .args(["expand", "--suite", "spark"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hash-records-clash"));
}

#[test]
fn test_expand_continue_on_error_skips_failing_test() {
    let dir = tempdir().unwrap();
    let path = write_config(&dir, CONFLICTING_EXTRA_TEST);

    let output = sparkperf()
        .arg("--config")
        .arg(&path)
        .args(["expand", "--suite", "spark", "--continue-on-error", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tests = report["tests"].as_array().unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0]["short_name"], "scheduling-throughput");
    assert_eq!(report["failed"], serde_json::json!(["spark/hash-records-clash"]));
}

#[test]
fn test_expand_text_quotes_empty_values() {
    sparkperf()
        .args(["expand", "--suite", "mllib", "--test", "decision-tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"--training-data "" --test-data """#));
}
