pub mod batcher;
pub mod coordinate_filter;
pub mod file_processor;
pub mod orchestrator;
pub mod transform;

pub use batcher::BatchAccumulator;
pub use coordinate_filter::filter_valid;
pub use file_processor::{FileProcessor, FileReport};
pub use orchestrator::{Orchestrator, TypeReport};
pub use transform::decode_values;
