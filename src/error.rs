use reqwest::StatusCode;
use std::error::Error;
use std::fmt;

/// Failure of a single API request after rate limits have been resolved
#[derive(Debug)]
pub enum FetchError {
    /// Non-success, non-429 response. Never retried.
    Upstream { status: StatusCode },
    /// The request never produced a response
    Transport(String),
    /// A success response whose body was not JSON
    InvalidBody(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Upstream { status } => write!(f, "Upstream returned {status}"),
            FetchError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FetchError::InvalidBody(msg) => write!(f, "Invalid response body: {msg}"),
        }
    }
}

impl Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::InvalidBody(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Pipeline stage names, used to report where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Enumerate,
    Collect,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Enumerate => write!(f, "enumerate"),
            Stage::Collect => write!(f, "collect"),
            Stage::Render => write!(f, "render"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// A stage was handed nothing to work on
    EmptyInput(Stage),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyInput(stage) => write!(f, "Empty input to {stage} stage"),
        }
    }
}

impl Error for PipelineError {}
