use thiserror::Error;

use crate::domain::RestrictionType;

/// A challenge rule that cannot be evaluated against the measurement schema.
///
/// These are configuration problems: they are reported for the single
/// challenge and never abort the rest of a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown subcategory '{subcategory}' in category {category}")]
    UnknownSubcategory {
        category: String,
        subcategory: String,
    },

    #[error("Invalid {restriction} rule: {message}")]
    InvalidRule {
        restriction: RestrictionType,
        message: String,
    },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
