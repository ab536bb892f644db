pub mod crossref;
pub mod detail;
pub mod export;

pub use crossref::CrossRefPipeline;
pub use detail::DetailPipeline;
pub use export::ExportPipeline;
