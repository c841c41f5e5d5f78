use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConciergeError {
    #[error("invalid masking pattern: {reason}")]
    InvalidPattern { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("user directory error in {path}: {reason}")]
    UserDirectory { path: PathBuf, reason: String },

    #[error("store catalog error in {path}: {reason}")]
    StoreCatalog { path: PathBuf, reason: String },

    #[error("reasoning backend error: {reason}")]
    Backend { reason: String },

    #[error("malformed backend output: {reason}")]
    MalformedOutput { reason: String },

    #[error("server error: {reason}")]
    Server { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error: status={status}, body={body}")]
    Api { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, ConciergeError>;
