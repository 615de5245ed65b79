pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod output;
pub mod pattern;
pub mod report;
pub mod scanner;
pub mod version;

pub use builder::ExportListBuilder;
pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use filter::{FnFilter, PackageFilter, PatternFilter, Selection};
pub use model::{ExportPackage, PackageConflict, ScanReport};
pub use report::{RecordingReporter, ScanReporter, TracingReporter};
pub use scanner::PackageScanner;
pub use version::{normalize, VersionMapping, VersionResolver};
