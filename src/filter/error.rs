use thiserror::Error;

/// Errors that can occur when parsing filter expressions
#[derive(Debug, Error)]
pub enum FilterParseError {
    #[error(
        "unknown object kind: '{0}'. Valid kinds are: charm (c), application (a), unit (u), machine (m), ip (i), hostname (h)"
    )]
    UnknownObjectKind(String),

    #[error("no operator in filter '{0}'. Supported operators: = != ~ !~")]
    MissingOperator(String),

    #[error("more than one operator in filter '{0}'")]
    MultipleOperators(String),

    #[error("unknown operator '{operator}' in filter '{filter}'. Supported operators: = != ~ !~")]
    UnknownOperator { filter: String, operator: String },

    #[error("empty operand in filter '{0}'")]
    EmptyOperand(String),

    #[error("reserved character '{character}' in filter operand '{operand}'")]
    ReservedCharacter { operand: String, character: char },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
