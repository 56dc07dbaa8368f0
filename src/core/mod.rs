// Public modules
pub mod error;
pub mod registry;
pub mod report;
pub mod settings;
pub mod signal;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use registry::{Registry, RegistryKey};
pub use report::{report, ErrorRecord, SourceSpan};
pub use settings::Settings;
pub use signal::{convert_fragment, convert_source, Fragment, FragmentOutcome};
