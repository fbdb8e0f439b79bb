use thiserror::Error;

/// Author mistakes in a shape, raised while building a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("arguments '{field}' and '{contender}' collide on short name '-{name}'")]
    ShortNameCollision {
        field: String,
        contender: String,
        name: String,
    },

    #[error("arguments '{field}' and '{contender}' collide on long name '--{name}'")]
    LongNameCollision {
        field: String,
        contender: String,
        name: String,
    },

    #[error("plain-args specified twice ('{first}' and '{second}')")]
    DuplicatePlainArgs { first: String, second: String },

    #[error("plain-args field '{field}' is not a list<text> (found {found})")]
    PlainArgsType { field: String, found: String },

    #[error("subcommand '{name}' declared twice")]
    DuplicateSubcommand { name: String },

    #[error("option '{field}' has unsupported type {found}")]
    UnsupportedOptionType { field: String, found: String },

    #[error("invalid option name '{name}' on field '{field}': {reason}")]
    InvalidName {
        field: String,
        name: String,
        reason: &'static str,
    },
}

/// Tagged category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    Malformed,
    Unrecognized,
    MissingValue,
    MandatoryMissing,
    InvalidValue,
    TargetMismatch,
}

/// Bad user input (or a target that does not match its registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("leading string '---' is not allowed: {token}")]
    Malformed { token: String },

    #[error("unrecognized argument: {flag}")]
    Unrecognized { flag: String },

    #[error("argument {flag} requires a value but none was supplied")]
    MissingValue { flag: String },

    #[error("mandatory argument {flag} ('{field}') not present")]
    MandatoryMissing { field: String, flag: String },

    #[error("invalid value '{value}' for {flag}: expected {expected}")]
    InvalidValue {
        flag: String,
        value: String,
        expected: String,
    },

    #[error("target mismatch: {0}")]
    TargetMismatch(String),
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::Malformed { .. } => ParseErrorKind::Malformed,
            Self::Unrecognized { .. } => ParseErrorKind::Unrecognized,
            Self::MissingValue { .. } => ParseErrorKind::MissingValue,
            Self::MandatoryMissing { .. } => ParseErrorKind::MandatoryMissing,
            Self::InvalidValue { .. } => ParseErrorKind::InvalidValue,
            Self::TargetMismatch(_) => ParseErrorKind::TargetMismatch,
        }
    }

    /// For [`Target`](crate::Target) impls that are handed a field they do not have.
    pub fn unknown_field(shape: &str, field: &str) -> Self {
        Self::TargetMismatch(format!("shape '{shape}' has no writable field '{field}'"))
    }
}

/// Either failure of the one-shot entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type ParseResult<T> = Result<T, ParseError>;
