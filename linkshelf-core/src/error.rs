use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A heading tag whose suffix is not a positive integer level.
    #[error("malformed heading tag `{tag}` on item `{title}`")]
    MalformedInput { tag: String, title: String },

    /// A nested folder whose explicit level is not deeper than its parent's.
    #[error(
        "folder `{child}` has level {child_level}, which is not deeper than its parent `{parent}` (level {parent_level})"
    )]
    LevelOrder {
        parent: String,
        parent_level: u32,
        child: String,
        child_level: u32,
    },

    #[error("failed to fetch tree data from {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("invalid tree data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preference storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("http client setup failed: {0}")]
    HttpClient(String),
}

impl CoreError {
    pub fn fetch(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(reason: impl ToString) -> Self {
        Self::StorageUnavailable(reason.to_string())
    }
}
