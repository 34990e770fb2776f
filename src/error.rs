use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReframeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Process invocation has no program")]
    EmptyInvocation,

    /// The program could not be started at all (missing binary, permission denied, ...).
    #[error("Failed to launch '{program}' (not found or not executable)")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but did not exit with status 0.
    #[error("'{program}' exited abnormally ({})", describe_exit(.code, .signal))]
    AbnormalExit {
        program: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("exit code {}", code),
        (None, Some(signal)) => format!("terminated by signal {}", signal),
        (None, None) => "unknown status".to_string(),
    }
}

impl ReframeError {
    /// Exit code the command-line tool reports for this error.
    ///
    /// A child's own exit code is propagated as-is, death by signal maps to
    /// `128 + signal` like a shell does, and a launch failure maps to 127.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReframeError::Launch { .. } => 127,
            ReframeError::AbnormalExit { code: Some(code), .. } => *code,
            ReframeError::AbnormalExit { signal: Some(signal), .. } => 128 + signal,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReframeError>;
