pub mod model;
pub mod ports;

pub use model::{DetailRecord, Feature, FeatureCollection, JoinSummary, LabelSpec, MatchRecord};
pub use ports::{ConfigProvider, Pipeline, Storage};
