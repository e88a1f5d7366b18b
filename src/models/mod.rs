pub mod data_type;
pub mod sample;
pub mod tower;

pub use data_type::DataType;
pub use sample::SampleRecord;
pub use tower::Tower;
