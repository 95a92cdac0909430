//! Error type shared by every stage of the pipeline.

pub type Result<T, E = FuzzyError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum FuzzyError {
    /// A rule concludes about a different universe than the rules already in the engine.
    #[error("target universe mismatch: rule concludes about `{found}` but the engine targets `{expected}`")]
    TargetMismatch { expected: String, found: String },

    #[error("{engine} engine cannot hold a {rule} rule")]
    RuleKind { engine: &'static str, rule: &'static str },

    #[error("cannot combine expression with {0}")]
    Composition(String),

    #[error("fuzzy set name must be an identifier, got `{0}`")]
    InvalidName(String),

    #[error("fuzzy set `{set}` not found in universe `{universe}`")]
    UnknownSet { universe: String, set: String },

    #[error("`{0}` not found in linguistic variable")]
    MissingInput(String),

    #[error("value for `{0}` must be a number or numeric array")]
    Validation(String),

    #[error("invalid membership parameters: {0}")]
    Parameters(String),

    #[error("invalid domain for universe `{universe}`: {reason}")]
    InvalidDomain { universe: String, reason: &'static str },

    #[error("shape mismatch: array of length {left} against array of length {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("expected a scalar, got an array of length {0}")]
    NotScalar(usize),

    /// Centroid or weighted average would divide by zero.
    #[error("degenerate inference: {0}")]
    Degenerate(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
