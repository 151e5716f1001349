use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("No catalog available for service: {0}")]
    MissingCatalog(String),

    #[error("Malformed JMX snapshot: {0}")]
    Snapshot(String),

    #[error("Malformed embedded list in field '{field}': {message}")]
    EmbeddedList { field: String, message: String },

    #[error("JMX endpoint {url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("Exposition encoding failed: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ExporterError {
    /// Short, stable name of the error variant for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ExporterError::Http(e) if e.is_timeout() => "timeout",
            ExporterError::Http(_) => "http",
            ExporterError::Status { .. } => "status",
            ExporterError::Json(_) | ExporterError::Snapshot(_) => "decode",
            ExporterError::EmbeddedList { .. } => "embedded_list",
            ExporterError::Toml(_) | ExporterError::Config(_) | ExporterError::Env(_) => "config",
            ExporterError::Io(_) => "io",
            ExporterError::Encode(_) | ExporterError::Utf8(_) => "encode",
            ExporterError::UnknownService(_) | ExporterError::MissingCatalog(_) => "service",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
