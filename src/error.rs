use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MintError {
    #[error("[Line {line}] Error{location}: {message}")]
    SyntaxError {
        line: usize,
        location: String,
        message: String,
    },

    #[error("[Line {line}] {error}")]
    Runtime { line: usize, error: RuntimeError },

    #[error("Could not write output: {0}")]
    Output(String),
}

/// A failure while running a program, before the line it happened on is known
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{0}'.")]
    UnboundVariable(String),

    #[error("Operands of '{operation}' have incompatible kinds: {operands}.")]
    TypeMismatch { operation: String, operands: String },

    #[error("Can only call functions, got {0}.")]
    NotCallable(String),

    #[error("Expected {expected} arguments but got {actual}.")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Maximum call depth of {0} exceeded.")]
    StackOverflow(usize),
}

impl RuntimeError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnboundVariable(_) => "UnboundVariable",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::NotCallable(_) => "NotCallable",
            Self::ArityMismatch { .. } => "ArityMismatch",
            Self::StackOverflow(_) => "StackOverflow",
        }
    }

    pub fn at(self, line: usize) -> MintError {
        MintError::Runtime { line, error: self }
    }
}

impl MintError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SyntaxError { .. } => "SyntaxError",
            Self::Runtime { error, .. } => error.kind(),
            Self::Output(_) => "Output",
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::SyntaxError { .. })
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::SyntaxError { line, .. } | Self::Runtime { line, .. } => Some(*line),
            Self::Output(_) => None,
        }
    }

    pub(crate) fn syntax(line: usize, location: String, message: &str) -> Self {
        Self::SyntaxError {
            line,
            location,
            message: message.to_owned(),
        }
    }
}

impl From<std::io::Error> for MintError {
    fn from(error: std::io::Error) -> Self {
        Self::Output(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_line() {
        let error = RuntimeError::UnboundVariable("x".to_owned()).at(3);
        assert_eq!(error.to_string(), "[Line 3] Undefined variable 'x'.");
        assert_eq!(error.kind(), "UnboundVariable");
        assert_eq!(error.line(), Some(3));

        let error = MintError::syntax(1, " at end".to_owned(), "Expect expression.");
        assert_eq!(error.to_string(), "[Line 1] Error at end: Expect expression.");
        assert!(error.is_syntax());
    }
}
