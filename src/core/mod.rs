pub mod detail;
pub mod etl;
pub mod fetcher;
pub mod join;

pub use crate::domain::model::{DetailRecord, Feature, FeatureCollection, JoinSummary, MatchRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
