use thiserror::Error;

/// Errors raised while loading, saving, or building experience tables.
#[derive(Error, Debug)]
pub enum ExperienceError {
    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ran out before every cell was read.
    #[error("table truncated: expected {expected} tokens, found {found}")]
    Truncated { expected: usize, found: usize },

    /// A token could not be parsed as the value expected at its position.
    #[error("invalid {kind} at token {position}: {token:?}")]
    InvalidToken {
        position: usize,
        token: String,
        kind: TokenKind,
    },

    /// Tensors offered to a constructor do not have an S x S x A shape.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    Shape {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
}

/// Which half of a (visits, reward) pair a token was meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Visits,
    Reward,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Visits => write!(f, "visit count"),
            TokenKind::Reward => write!(f, "reward sum"),
        }
    }
}

/// Errors raised while loading the tool configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration file: {0}")]
    Read(#[from] config_file::ConfigFileError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
