use std::{fmt, rc::Rc};

use crate::interpreter::lexer::Pos;

/// An abstract syntax tree (AST) node representing an expression.
///
/// Every construct of the language is an expression, from literals and
/// identifiers to control forms, function literals, calls and subset
/// operations. Each variant carries the source position of the token that
/// introduced it, which is threaded into every diagnostic.
///
/// Child nodes are reference counted rather than boxed: promises capture
/// argument expressions and closures capture bodies and parameter defaults,
/// so subtrees must stay alive independently of the parsed program.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a variable by name.
    Ident {
        /// Name of the variable.
        name: String,
        /// Source position.
        pos:  Pos,
    },
    /// A numeric literal.
    Number {
        /// The literal source text, kept for the integer/double decision.
        text:   String,
        /// The parsed value.
        value:  f64,
        /// Whether the source text contains no `.`, `e` or `E`.
        is_int: bool,
        /// Source position.
        pos:    Pos,
    },
    /// A string literal (escapes already resolved).
    Str {
        /// The decoded string value.
        value: String,
        /// Source position.
        pos:   Pos,
    },
    /// `TRUE` or `FALSE`.
    Bool {
        /// The literal value.
        value: bool,
        /// Source position.
        pos:   Pos,
    },
    /// The `NULL` literal.
    Null {
        /// Source position.
        pos: Pos,
    },
    /// The `NA` literal (canonical logical NA).
    Na {
        /// Source position.
        pos: Pos,
    },
    /// A unary operation such as `-x` or `!x`.
    Unary {
        /// The operator.
        op:      UnaryOp,
        /// The operand expression.
        operand: Rc<Expr>,
        /// Source position.
        pos:     Pos,
    },
    /// A binary operation such as `a + b` or `a %in% b`.
    Binary {
        /// The operator.
        op:    BinaryOp,
        /// Left operand.
        left:  Rc<Expr>,
        /// Right operand.
        right: Rc<Expr>,
        /// Source position.
        pos:   Pos,
    },
    /// An assignment (`<-`, `=`, `<<-` or `->`).
    Assign {
        /// The assignment operator.
        op:     AssignOp,
        /// The target expression (validated by the parser).
        target: Rc<Expr>,
        /// The value expression.
        value:  Rc<Expr>,
        /// Source position.
        pos:    Pos,
    },
    /// A `{ ... }` block of expressions.
    Block {
        /// The expressions in order.
        exprs: Vec<Rc<Expr>>,
        /// Source position.
        pos:   Pos,
    },
    /// An `if` expression with optional `else`.
    If {
        /// The condition.
        cond:        Rc<Expr>,
        /// Expression evaluated when the condition is true.
        then_branch: Rc<Expr>,
        /// Expression evaluated when the condition is false.
        else_branch: Option<Rc<Expr>>,
        /// Source position.
        pos:         Pos,
    },
    /// A `for (var in seq) body` loop.
    For {
        /// The loop variable name.
        var:  String,
        /// The sequence expression.
        seq:  Rc<Expr>,
        /// The loop body.
        body: Rc<Expr>,
        /// Source position.
        pos:  Pos,
    },
    /// A `while (cond) body` loop.
    While {
        /// The condition.
        cond: Rc<Expr>,
        /// The loop body.
        body: Rc<Expr>,
        /// Source position.
        pos:  Pos,
    },
    /// A `repeat body` infinite loop.
    Repeat {
        /// The loop body.
        body: Rc<Expr>,
        /// Source position.
        pos:  Pos,
    },
    /// The `break` control signal.
    Break {
        /// Source position.
        pos: Pos,
    },
    /// The `next` control signal.
    Next {
        /// Source position.
        pos: Pos,
    },
    /// A `return(...)` expression with optional value.
    Return {
        /// The returned expression, if any.
        value: Option<Rc<Expr>>,
        /// Source position.
        pos:   Pos,
    },
    /// A `function(params) body` literal.
    Function {
        /// The formal parameters.
        params: Vec<Param>,
        /// The function body.
        body:   Rc<Expr>,
        /// Source position.
        pos:    Pos,
    },
    /// A call expression `f(args...)`.
    Call {
        /// The callee expression.
        callee: Rc<Expr>,
        /// The arguments, optionally named.
        args:   Vec<Arg>,
        /// Source position.
        pos:    Pos,
    },
    /// A subset expression `x[i]` or `x[[i]]`.
    Index {
        /// The subsetted expression.
        target: Rc<Expr>,
        /// The index expression.
        index:  Rc<Expr>,
        /// Whether the double-bracket form was used.
        double: bool,
        /// Source position.
        pos:    Pos,
    },
    /// A member access `x$name`.
    Dollar {
        /// The accessed expression.
        target: Rc<Expr>,
        /// The member name.
        member: String,
        /// Source position.
        pos:    Pos,
    },
}

impl Expr {
    /// Gets the source position of this node.
    #[must_use]
    pub const fn pos(&self) -> Pos {
        match self {
            Self::Ident { pos, .. }
            | Self::Number { pos, .. }
            | Self::Str { pos, .. }
            | Self::Bool { pos, .. }
            | Self::Null { pos }
            | Self::Na { pos }
            | Self::Unary { pos, .. }
            | Self::Binary { pos, .. }
            | Self::Assign { pos, .. }
            | Self::Block { pos, .. }
            | Self::If { pos, .. }
            | Self::For { pos, .. }
            | Self::While { pos, .. }
            | Self::Repeat { pos, .. }
            | Self::Break { pos }
            | Self::Next { pos }
            | Self::Return { pos, .. }
            | Self::Function { pos, .. }
            | Self::Call { pos, .. }
            | Self::Index { pos, .. }
            | Self::Dollar { pos, .. } => *pos,
        }
    }

    /// Gets the source line of this node.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos().line
    }
}

/// A formal parameter of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The parameter name (`"..."` for the dots parameter).
    pub name:    String,
    /// The default expression, if one was written with `=`.
    pub default: Option<Rc<Expr>>,
    /// Whether this is the variadic `...` parameter.
    pub dots:    bool,
}

/// A call-site argument, optionally named with `name = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// The argument name, if given.
    pub name:  Option<String>,
    /// The argument expression.
    pub value: Rc<Expr>,
}

/// A parsed program: an ordered sequence of top-level expressions.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// The top-level expressions in source order.
    pub exprs: Vec<Rc<Expr>>,
}

/// Unary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    /// Numeric identity (`+x`), which still coerces to double.
    Plus,
    /// Numeric negation (`-x`).
    Minus,
    /// Logical negation (`!x`).
    Not,
}

/// Binary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Exponentiation (`^`)
    Pow,
    /// Modulo (`%%`)
    Mod,
    /// Integer division (`%/%`)
    IntDiv,
    /// Membership (`%in%`)
    In,
    /// Sequence (`:`)
    Seq,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Equal (`==`)
    Eq,
    /// Not equal (`!=`)
    Ne,
    /// Vectorized and (`&`)
    And,
    /// Vectorized or (`|`)
    Or,
    /// Short-circuit and (`&&`)
    AndAnd,
    /// Short-circuit or (`||`)
    OrOr,
}

/// Assignment operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssignOp {
    /// Left arrow (`<-`)
    Left,
    /// Equals (`=`)
    Eq,
    /// Super-assignment (`<<-`)
    Super,
    /// Right arrow (`->`)
    Right,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
        };
        write!(f, "{op}")
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Mod => "%%",
            Self::IntDiv => "%/%",
            Self::In => "%in%",
            Self::Seq => ":",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&",
            Self::Or => "|",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        };
        write!(f, "{op}")
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Left => "<-",
            Self::Eq => "=",
            Self::Super => "<<-",
            Self::Right => "->",
        };
        write!(f, "{op}")
    }
}

impl fmt::Display for Expr {
    /// Renders the expression in the deparsed form used by `quote()` values
    /// and diagnostics. Grouping parentheses are inserted around operator
    /// nodes so the rendering is unambiguous.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident { name, .. } => write!(f, "{name}"),
            Self::Number { text, .. } => write!(f, "{text}"),
            Self::Str { value, .. } => write!(f, "{value:?}"),
            Self::Bool { value, .. } => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            Self::Null { .. } => write!(f, "NULL"),
            Self::Na { .. } => write!(f, "NA"),
            Self::Unary { op, operand, .. } => write!(f, "({op}{operand})"),
            Self::Binary { op, left, right, .. } => write!(f, "({left} {op} {right})"),
            Self::Assign { op, target, value, .. } => write!(f, "({target} {op} {value})"),
            Self::Block { exprs, .. } => {
                write!(f, "{{ ")?;
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, " }}")
            },
            Self::If { cond,
                       then_branch,
                       else_branch,
                       .. } => match else_branch {
                Some(e) => write!(f, "(if {cond} {then_branch} else {e})"),
                None => write!(f, "(if {cond} {then_branch})"),
            },
            Self::For { var, seq, body, .. } => write!(f, "(for {var} in {seq} {body})"),
            Self::While { cond, body, .. } => write!(f, "(while {cond} {body})"),
            Self::Repeat { body, .. } => write!(f, "(repeat {body})"),
            Self::Break { .. } => write!(f, "break"),
            Self::Next { .. } => write!(f, "next"),
            Self::Return { value, .. } => match value {
                Some(v) => write!(f, "return({v})"),
                None => write!(f, "return()"),
            },
            Self::Function { .. } => write!(f, "function(...)"),
            Self::Call { callee, .. } => write!(f, "{callee}(...)"),
            Self::Index { target, index, double, .. } => {
                if *double {
                    write!(f, "{target}[[{index}]]")
                } else {
                    write!(f, "{target}[{index}]")
                }
            },
            Self::Dollar { target, member, .. } => write!(f, "{target}${member}"),
        }
    }
}
