pub mod etl;
pub mod normalize;
pub mod pipeline;
pub mod report_pipeline;
pub mod stats;

pub use crate::domain::model::{PortfolioStats, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
