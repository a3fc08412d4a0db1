use chrono::NaiveDate;

// Error handling for everything outside the pure calculation core
#[derive(Debug, thiserror::Error)]
pub enum AlmanacError {
    #[error("Invalid calendar month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Failed to parse '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("UTC offset out of range: {0} minutes")]
    InvalidOffset(i32),

    #[error("Invalid value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("Date outside the representable range: {0}")]
    OutOfRange(NaiveDate),
}

pub type Result<T> = std::result::Result<T, AlmanacError>;
