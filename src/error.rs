use thiserror::Error;

/// Failures of the commit-authoring core.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("cannot connect to Ollama at {url}: {reason}\nPlease make sure Ollama is running:\n  $ ollama serve")]
    Connectivity { url: String, reason: String },

    #[error("model '{model}' not found\nInstall it with:\n  $ ollama pull {model}")]
    ModelMissing { model: String },

    #[error("ollama error: {0}")]
    Inference(String),

    #[error("commit cancelled by user")]
    UserCancelled,

    #[error("max retries reached after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    #[error("commit message cannot be empty")]
    EmptyInput,

    #[error("failed to commit: {0}")]
    Commit(String),
}

/// Failures while waiting on the user. The controller treats all of them as Cancel.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("selection interrupted")]
    Interrupted,

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, CommitError>;
