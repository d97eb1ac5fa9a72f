pub mod analysis;
pub mod consts;
pub mod error;
pub mod inference;
pub mod layout;
pub mod ocr;
pub mod pipeline;
pub mod records;
pub mod relation;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use pipeline::{
    ConvertConfig, ConvertConfigBuilder, RelateConfig, RelateConfigBuilder, RelatePipeline,
};
