#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("MFA code prompt failed: {0}")]
    PromptError(String),

    /// Message from the identity service, passed through verbatim
    #[error("API Error: {0}")]
    ApiError(String),

    #[error(transparent)]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was raised before any external call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(*self, Self::Validation(_) | Self::ConfigError(_))
    }
}
