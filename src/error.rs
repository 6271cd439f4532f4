use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Dataset error: {0}")]
    Dataset(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Wrong number of arguments to {function}: {message}")]
    Arity { function: String, message: String },
    #[error("Domain error in {function}: {message}")]
    Domain { function: String, message: String },
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

// Helper conversions
impl From<config::ConfigError> for EngineError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Dataset(e.to_string())
    }
}
impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Dataset(e.to_string())
    }
}
