use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unsupported file type '{0}' (expected .xlsx, .csv or .tsv)")]
    UnsupportedFile(String),

    #[error("failed to load table: {0}")]
    Load(String),

    #[error("expected column '{column}' is missing from the uploaded table")]
    MissingColumn { column: String },

    #[error("at least one recipient address is required")]
    NoRecipients,

    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to compose email: {0}")]
    Compose(String),

    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("email delivery failed: {0}")]
    Delivery(String),
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Load(err.to_string())
    }
}
