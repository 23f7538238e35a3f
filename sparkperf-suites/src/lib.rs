//! Benchmark suites for sparkperf
//!
//! Declares the option axes of every test, expands them into the concrete
//! argument lists a driver launches, and names the result files.

pub mod catalog;
pub mod expander;
pub mod option;
pub mod output;
pub mod registry;
pub mod suite;

pub use catalog::{Catalog, CatalogContext};
pub use expander::{expand, ArgumentList, ExpansionResult, PreparedAxes};
pub use option::OptionAxis;
pub use output::{output_filename, output_path};
pub use registry::{VersionGate, VersionedAxes};
pub use suite::{ResolvedRun, Suite, SuiteKind, TestDeclaration, TestSuiteDescriptor};
