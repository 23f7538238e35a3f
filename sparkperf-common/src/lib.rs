pub mod types;
pub mod error;
pub mod config;

pub use types::*;
pub use error::{ErrorCategory, PerfError, Result};
pub use config::{
    AxisSpec, BuildConfig, ClusterConfig, DiskWarmupConfig, ExtraTestSpec,
    OutputConfig, PerfConfig, SuiteSelection, TestTuning,
};
