pub mod constants;
pub mod discovery;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use discovery::discover_files;
pub use filename::file_stem;
pub use progress::ProgressReporter;
