/// Errors reported by the symbol table and by expression evaluation.
///
/// Evaluation stops at the first error encountered during the left-to-right
/// scan; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The name is empty, starts with a digit, or contains a character other
    /// than an ASCII letter, digit or underscore.
    #[error("illegal name")]
    IllegalName,
    /// A symbol with the same name is already in the table.
    #[error("name is already defined")]
    AlreadyDefined,
    /// The expression references an unknown identifier, or a removal targeted
    /// a name that is not in the table.
    #[error("undefined name")]
    Undefined,
    /// The expression does not follow the enabled grammar.
    #[error("syntax error")]
    SyntaxError,
    /// A function was called with the wrong number of arguments.
    #[error("incorrect number of arguments")]
    IncorrectArgsNum,
    /// An error raised by a user-supplied function.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an error carrying a user-defined message.
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }
}
