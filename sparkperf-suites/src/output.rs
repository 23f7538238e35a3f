//! Result file naming

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::suite::SuiteKind;

pub const DEFAULT_RESULTS_DIR: &str = "results";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `<prefix>_perf_output_<commit>_<timestamp>`. Slashes in the commit id
/// (branch names such as `origin/master`) become dashes.
pub fn output_file_stem(kind: SuiteKind, commit_id: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_perf_output_{}_{}",
        kind.output_prefix(),
        commit_id.replace('/', "-"),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Result file under the default `results` directory
pub fn output_filename(kind: SuiteKind, commit_id: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}/{}",
        DEFAULT_RESULTS_DIR,
        output_file_stem(kind, commit_id, timestamp)
    )
}

pub fn output_path(
    results_dir: impl AsRef<Path>,
    kind: SuiteKind,
    commit_id: &str,
    timestamp: &NaiveDateTime,
) -> PathBuf {
    results_dir
        .as_ref()
        .join(output_file_stem(kind, commit_id, timestamp))
}
