#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// The lexer hit a character sequence that is not a valid token.
    IllegalToken {
        /// The offending text.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A string literal was not closed before the end of input.
    UnterminatedString {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A string literal ended in the middle of an escape sequence.
    UnterminatedEscape {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A backtick-quoted identifier was not closed.
    UnterminatedBacktick {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A specific token was expected but something else was found.
    ExpectedToken {
        /// Description of the expected token.
        expected: String,
        /// The token actually found.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// The left-hand side of an assignment is not assignable.
    InvalidAssignTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A parameter list contained something other than names and defaults.
    BadParameter {
        /// The token encountered.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A numeric literal could not be parsed.
    InvalidNumber {
        /// The literal text.
        text: String,
        /// The source line where the error occurred.
        line: usize,
    },
}

impl ParseError {
    /// The source line the error is attached to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::IllegalToken { line, .. }
            | Self::UnterminatedString { line }
            | Self::UnterminatedEscape { line }
            | Self::UnterminatedBacktick { line }
            | Self::UnexpectedToken { line, .. }
            | Self::UnexpectedEndOfInput { line }
            | Self::ExpectedToken { line, .. }
            | Self::InvalidAssignTarget { line }
            | Self::BadParameter { line, .. }
            | Self::InvalidNumber { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalToken { token, line } => {
                write!(f, "Error on line {line}: Illegal token '{token}'.")
            },
            Self::UnterminatedString { line } => {
                write!(f, "Error on line {line}: Unterminated string literal.")
            },
            Self::UnterminatedEscape { line } => {
                write!(f, "Error on line {line}: Unterminated escape sequence in string literal.")
            },
            Self::UnterminatedBacktick { line } => {
                write!(f, "Error on line {line}: Unterminated backtick identifier.")
            },
            Self::UnexpectedToken { token, line } => {
                write!(f, "Error on line {line}: Unexpected token: {token}.")
            },
            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: Unexpected end of input.")
            },
            Self::ExpectedToken { expected, found, line } => {
                write!(f, "Error on line {line}: Expected next token {expected}, got {found}.")
            },
            Self::InvalidAssignTarget { line } => {
                write!(f, "Error on line {line}: Invalid assignment target.")
            },
            Self::BadParameter { token, line } => write!(f,
                                                         "Error on line {line}: Unexpected token in parameter list: {token}."),
            Self::InvalidNumber { text, line } => {
                write!(f, "Error on line {line}: Invalid number: {text}.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
