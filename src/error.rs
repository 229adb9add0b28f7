use thiserror::Error;

/// Library error type for slider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The slide catalog contains no slides.
    #[error("slide catalog is empty")]
    EmptyCatalog,

    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Unrecoverable failure of the rendering surface.
    #[error("render error: {0}")]
    Render(anyhow::Error),
}
