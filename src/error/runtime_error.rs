#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during evaluation.
///
/// Every variant carries the source line of the expression that raised it.
/// The [`Display`](std::fmt::Display) rendering prefixes the message with the
/// line for top-level reporting; [`RuntimeError::message`] yields the bare
/// message, which is what `tryCatch` error handlers receive.
pub enum RuntimeError {
    /// Name lookup failed.
    ObjectNotFound {
        /// The name that was looked up.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A non-callable value appeared in call position.
    NotAFunction {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value of one type could not be converted to another.
    CannotCoerce {
        /// The source type name.
        from: String,
        /// The target type name.
        to:   String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A specific element could not be converted to another type.
    CannotCoerceValue {
        /// Rendering of the offending element.
        value: String,
        /// The target type name.
        to:    String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An operator was applied to a type that does not support it.
    UnsupportedOperator {
        /// The operator text.
        op:   String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A length-1 value was required but a longer one was supplied.
    ScalarExpected {
        /// The actual length.
        len:  usize,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A length-1 logical was required but a longer one was supplied.
    ScalarLogicalExpected {
        /// The actual length.
        len:  usize,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The double-bracket operator received a non-scalar index.
    SingleIndexExpected {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An index referred to a position outside the value.
    SubscriptOutOfBounds {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Positive and negative subscripts were mixed.
    MixedSubscripts {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The index value has a type that cannot select elements.
    InvalidSubscriptType {
        /// The index type name.
        ty:   String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Subsetting was attempted on a value that cannot be subset.
    NotSubsettable {
        /// The target type name.
        ty:   String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// `$` was used on an atomic vector.
    DollarOnAtomic {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A condition evaluated to NA.
    NaCondition {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `break` escaped every loop.
    BreakOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `next` escaped every loop.
    NextOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A call supplied an argument no formal parameter accepts.
    UnusedArgument {
        /// The argument name, if it was named.
        name: Option<String>,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A formal parameter was matched by more than one actual argument.
    DuplicateArgument {
        /// The parameter name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The left-hand side of an assignment is not assignable.
    InvalidAssignTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A subset assignment form is not defined for the target type.
    IndexAssignUnsupported {
        /// The assignment operator text (`[<-`, `[[<-` or `$<-`).
        op:   String,
        /// The target type name.
        ty:   String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A promise was re-entered while it was being forced.
    PromiseCycle {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A builtin rejected its arguments.
    InvalidArgument {
        /// Details about why the arguments are invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An error raised by user code via `stop()`.
    UserError {
        /// The user-supplied message.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl RuntimeError {
    /// The source line the error is attached to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::ObjectNotFound { line, .. }
            | Self::NotAFunction { line }
            | Self::CannotCoerce { line, .. }
            | Self::CannotCoerceValue { line, .. }
            | Self::UnsupportedOperator { line, .. }
            | Self::ScalarExpected { line, .. }
            | Self::ScalarLogicalExpected { line, .. }
            | Self::SingleIndexExpected { line }
            | Self::SubscriptOutOfBounds { line }
            | Self::MixedSubscripts { line }
            | Self::InvalidSubscriptType { line, .. }
            | Self::NotSubsettable { line, .. }
            | Self::DollarOnAtomic { line }
            | Self::NaCondition { line }
            | Self::BreakOutsideLoop { line }
            | Self::NextOutsideLoop { line }
            | Self::UnusedArgument { line, .. }
            | Self::DuplicateArgument { line, .. }
            | Self::InvalidAssignTarget { line }
            | Self::IndexAssignUnsupported { line, .. }
            | Self::PromiseCycle { line }
            | Self::InvalidArgument { line, .. }
            | Self::UserError { line, .. } => *line,
        }
    }

    /// The bare message without the line prefix.
    ///
    /// This is the text handed to a `tryCatch` error handler, so a raised
    /// `stop("oops")` arrives as exactly `"oops"`.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ObjectNotFound { name, .. } => format!("object '{name}' not found"),
            Self::NotAFunction { .. } => "attempt to apply non-function".to_string(),
            Self::CannotCoerce { from, to, .. } => format!("cannot coerce {from} to {to}"),
            Self::CannotCoerceValue { value, to, .. } => {
                format!("cannot coerce '{value}' to {to}")
            },
            Self::UnsupportedOperator { op, .. } => format!("unsupported operator {op}"),
            Self::ScalarExpected { len, .. } => format!("expected scalar, got length {len}"),
            Self::ScalarLogicalExpected { len, .. } => {
                format!("expected scalar logical, got length {len}")
            },
            Self::SingleIndexExpected { .. } => "[[ expects a single index".to_string(),
            Self::SubscriptOutOfBounds { .. } => "subscript out of bounds".to_string(),
            Self::MixedSubscripts { .. } => {
                "only 0's may be mixed with negative subscripts".to_string()
            },
            Self::InvalidSubscriptType { ty, .. } => format!("invalid subscript type {ty}"),
            Self::NotSubsettable { ty, .. } => {
                format!("object of type '{ty}' is not subsettable")
            },
            Self::DollarOnAtomic { .. } => "$ operator is invalid for atomic vectors".to_string(),
            Self::NaCondition { .. } => "missing value where TRUE/FALSE needed".to_string(),
            Self::BreakOutsideLoop { .. } => "break used outside of a loop".to_string(),
            Self::NextOutsideLoop { .. } => "next used outside of a loop".to_string(),
            Self::UnusedArgument { name, .. } => match name {
                Some(n) => format!("unused argument '{n}'"),
                None => "unused argument (positional)".to_string(),
            },
            Self::DuplicateArgument { name, .. } => {
                format!("formal argument '{name}' matched by multiple actual arguments")
            },
            Self::InvalidAssignTarget { .. } => "invalid assignment target".to_string(),
            Self::IndexAssignUnsupported { op, ty, .. } => {
                format!("{op} assignment not supported for type {ty}")
            },
            Self::PromiseCycle { .. } => "promise already under evaluation".to_string(),
            Self::InvalidArgument { details, .. } => details.clone(),
            Self::UserError { message, .. } => message.clone(),
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error on line {}: {}", self.line(), self.message())
    }
}

impl std::error::Error for RuntimeError {}
