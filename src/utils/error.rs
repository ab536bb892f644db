use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Feature service returned status {status} for {url}")]
    ServiceStatusError { status: u16, url: String },

    #[error("Pagination exceeded {max_pages} pages ({records} records accumulated) without a short page")]
    PaginationLimit { max_pages: usize, records: usize },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

}

pub type Result<T> = std::result::Result<T, ParcelError>;
