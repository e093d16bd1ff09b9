use std::fmt;

/// Failure raised while tokenizing or parsing PHP source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpError {
    Lexer { message: String, line: usize },
    Parser { message: String, line: usize },
}

impl PhpError {
    pub fn line(&self) -> usize {
        match self {
            PhpError::Lexer { line, .. } | PhpError::Parser { line, .. } => *line,
        }
    }
}

impl fmt::Display for PhpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpError::Lexer { message, line } => {
                write!(f, "lexer error on line {line}: {message}")
            }
            PhpError::Parser { message, line } => {
                write!(f, "parser error on line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for PhpError {}
