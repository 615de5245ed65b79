//! Version handling: normalization, file name heuristics and resolution.

mod filename;
mod normalizer;
mod resolver;

pub use filename::extract_version;
pub use normalizer::{
    is_osgi_version, normalize, DefaultVersionConverter, IdentityConverter, OsgiVersionConverter,
};
pub use resolver::{VersionMapping, VersionResolver, UNKNOWN_VERSION, VERSION_HEADERS};
