//! sparkperf - benchmark configuration generator for Spark performance suites
//!
//! Ties the configuration layer and the suite catalog together for the
//! `sparkperf` command-line tool.

pub use sparkperf_common as common;
pub use sparkperf_suites as suites;

/// Re-export the types most callers need
pub mod prelude {
    pub use crate::common::{PerfConfig, PerfError, PlatformVersion, RenderKind, ScalarValue};
    pub use crate::suites::{
        expand, Catalog, ExpansionResult, OptionAxis, ResolvedRun, SuiteKind, TestSuiteDescriptor,
    };
}
