use std::{error::Error, sync::Arc};

pub type GfxResult<T> = Result<T, GfxError>;

/// Generic error that contains all the different kinds of errors that may
/// occur when using the API
#[derive(Debug, Clone)]
pub enum GfxError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    /// A native shader library failed to load or an entry point failed to
    /// specialize. Creation paths surface this instead of returning a
    /// half-built object.
    ShaderCompileError(String),
    /// Native pipeline-state creation failed.
    PipelineCreateError(String),
    /// The feature exists on the abstract interface but has no implementation
    /// on this backend (acceleration structures, ray dispatch).
    Unsupported(&'static str),
}

impl std::fmt::Display for GfxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StringError(msg) => write!(f, "{}", msg),
            Self::IoError(e) => e.fmt(f),
            Self::ShaderCompileError(msg) => write!(f, "shader compilation failed: {}", msg),
            Self::PipelineCreateError(msg) => write!(f, "pipeline creation failed: {}", msg),
            Self::Unsupported(what) => write!(f, "unsupported: {}", what),
        }
    }
}

impl Error for GfxError {}

impl From<&str> for GfxError {
    fn from(str: &str) -> Self {
        Self::StringError(str.to_string())
    }
}

impl From<String> for GfxError {
    fn from(string: String) -> Self {
        Self::StringError(string)
    }
}

impl From<std::io::Error> for GfxError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}
