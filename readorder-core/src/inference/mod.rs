pub mod geometric;
pub mod mapper;
pub mod model;

pub use geometric::{GeometricConfig, GeometricOrdering};
pub use mapper::OrderMapper;
pub use model::{OrderingModel, PagePrediction, RankedBox};
