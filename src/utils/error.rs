use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Data unavailable: {message}")]
    DataUnavailable { message: String },

    #[error("Producer failed: {script} exited with status {status}")]
    ProducerFailure { script: String, status: i32 },

    #[error("All {dataset} rows rejected")]
    ValidationExhausted { dataset: String },

    #[error("Warehouse apply failed at {statement}: {message}")]
    ApplyError { statement: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
