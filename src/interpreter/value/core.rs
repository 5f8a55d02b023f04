use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    ast::{Expr, Param},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            env::Env,
        },
        value::attrs::Attributes,
    },
};

/// An atomic vector of one element type, with a per-element NA flag and an
/// attribute map. `None` elements are NA.
#[derive(Debug, Clone, Default)]
pub struct AtomicVec<T> {
    /// The elements; `None` marks NA.
    pub data:  Vec<Option<T>>,
    /// The attribute mapping.
    pub attrs: Attributes,
}

impl<T> AtomicVec<T> {
    /// Wraps raw element data with no attributes.
    #[must_use]
    pub fn new(data: Vec<Option<T>>) -> Self {
        Self { data,
               attrs: Attributes::new() }
    }

    /// The element count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A logical vector.
pub type LogicalVec = AtomicVec<bool>;
/// An integer vector.
pub type IntVec = AtomicVec<i64>;
/// A double vector.
pub type DoubleVec = AtomicVec<f64>;
/// A character vector.
pub type CharVec = AtomicVec<String>;

/// An ordered, heterogeneous list of values with an attribute map.
#[derive(Debug, Clone, Default)]
pub struct ListVec {
    /// The contained values.
    pub data:  Vec<Value>,
    /// The attribute mapping.
    pub attrs: Attributes,
}

impl ListVec {
    /// Wraps raw values with no attributes.
    #[must_use]
    pub fn new(data: Vec<Value>) -> Self {
        Self { data,
               attrs: Attributes::new() }
    }

    /// The element count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// A captured, unevaluated expression produced by `quote()`.
#[derive(Debug, Clone)]
pub struct ExprValue {
    /// The captured AST node.
    pub expr: Rc<Expr>,
}

/// The memoization state of a promise.
///
/// A promise is flagged as `Forcing` before its body runs; re-entering a
/// promise in that state is the reentrancy error demanded by the
/// force-at-most-once contract.
#[derive(Debug, Clone)]
pub enum PromiseState {
    /// Never forced.
    Pending,
    /// Currently being forced.
    Forcing,
    /// Forced; both values and errors are memoized.
    Done(EvalResult<Value>),
}

/// A lazy thunk pairing an unevaluated expression with the environment it
/// should be evaluated in.
#[derive(Debug)]
pub struct PromiseValue {
    /// The captured argument expression.
    pub expr:  Rc<Expr>,
    /// The environment the expression will be evaluated in.
    pub env:   Rc<Env>,
    /// The memoization state.
    pub state: RefCell<PromiseState>,
}

/// A call-site argument after evaluation wrapping: an optional name and a
/// value (usually a promise).
#[derive(Debug, Clone)]
pub struct ArgValue {
    /// The argument name, if the call site named it.
    pub name:  Option<String>,
    /// The argument value.
    pub value: Value,
}

/// The captured surplus arguments of a variadic call, bound to `...`.
#[derive(Debug, Clone)]
pub struct DotsValue {
    /// The surplus arguments in call order, names preserved.
    pub args: Vec<ArgValue>,
}

/// The implementation signature of a builtin function.
///
/// A builtin receives the evaluation context, the argument list (values are
/// promises unless the caller already forced them) and the source line of
/// the call for error reporting.
pub type BuiltinImpl = fn(&Context, &[ArgValue], usize) -> EvalResult<Value>;

/// A named builtin function.
pub struct BuiltinFn {
    /// The name the builtin is installed under.
    pub name: &'static str,
    /// The implementation.
    pub imp:  BuiltinImpl,
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

/// A user-defined function value capturing its defining environment.
#[derive(Debug)]
pub struct Closure {
    /// The formal parameters.
    pub params: Vec<Param>,
    /// The function body.
    pub body:   Rc<Expr>,
    /// The captured environment.
    pub env:    Rc<Env>,
}

/// Represents a runtime value.
///
/// This enum models every type that can appear in expressions, bindings,
/// function returns and printed output. Heap payloads sit behind `Rc`, so
/// cloning a `Value` is cheap; mutation goes through fresh clones of the
/// payload, giving the copy-on-write behavior assignment requires.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value (`NULL`).
    Null,
    /// The sentinel for a parameter that was neither supplied nor given a
    /// default.
    Missing,
    /// A logical vector.
    Logical(Rc<LogicalVec>),
    /// An integer vector.
    Int(Rc<IntVec>),
    /// A double vector.
    Double(Rc<DoubleVec>),
    /// A character vector.
    Char(Rc<CharVec>),
    /// A list.
    List(Rc<ListVec>),
    /// A captured expression.
    Expr(Rc<ExprValue>),
    /// A lazy argument.
    Promise(Rc<PromiseValue>),
    /// Captured variadic arguments.
    Dots(Rc<DotsValue>),
    /// A builtin function.
    Builtin(Rc<BuiltinFn>),
    /// A user-defined closure.
    Closure(Rc<Closure>),
}

impl Value {
    /// A length-1 logical vector.
    #[must_use]
    pub fn logical_scalar(v: bool) -> Self {
        Self::Logical(Rc::new(LogicalVec::new(vec![Some(v)])))
    }

    /// The canonical length-1 logical NA.
    #[must_use]
    pub fn logical_na() -> Self {
        Self::Logical(Rc::new(LogicalVec::new(vec![None])))
    }

    /// A length-1 integer vector.
    #[must_use]
    pub fn int_scalar(v: i64) -> Self {
        Self::Int(Rc::new(IntVec::new(vec![Some(v)])))
    }

    /// A length-1 integer NA.
    #[must_use]
    pub fn int_na() -> Self {
        Self::Int(Rc::new(IntVec::new(vec![None])))
    }

    /// A length-1 double vector.
    #[must_use]
    pub fn double_scalar(v: f64) -> Self {
        Self::Double(Rc::new(DoubleVec::new(vec![Some(v)])))
    }

    /// A length-1 double NA.
    #[must_use]
    pub fn double_na() -> Self {
        Self::Double(Rc::new(DoubleVec::new(vec![None])))
    }

    /// A length-1 character vector.
    #[must_use]
    pub fn char_scalar(v: impl Into<String>) -> Self {
        Self::Char(Rc::new(CharVec::new(vec![Some(v.into())])))
    }

    /// A length-1 character NA.
    #[must_use]
    pub fn char_na() -> Self {
        Self::Char(Rc::new(CharVec::new(vec![None])))
    }

    /// A logical vector from raw elements.
    #[must_use]
    pub fn logical_vec(data: Vec<Option<bool>>) -> Self {
        Self::Logical(Rc::new(LogicalVec::new(data)))
    }

    /// An integer vector from raw elements.
    #[must_use]
    pub fn int_vec(data: Vec<Option<i64>>) -> Self {
        Self::Int(Rc::new(IntVec::new(data)))
    }

    /// A double vector from raw elements.
    #[must_use]
    pub fn double_vec(data: Vec<Option<f64>>) -> Self {
        Self::Double(Rc::new(DoubleVec::new(data)))
    }

    /// A character vector from raw elements.
    #[must_use]
    pub fn char_vec(data: Vec<Option<String>>) -> Self {
        Self::Char(Rc::new(CharVec::new(data)))
    }

    /// A list from raw values.
    #[must_use]
    pub fn list(data: Vec<Value>) -> Self {
        Self::List(Rc::new(ListVec::new(data)))
    }

    /// A builtin function value.
    #[must_use]
    pub fn builtin(name: &'static str, imp: BuiltinImpl) -> Self {
        Self::Builtin(Rc::new(BuiltinFn { name, imp }))
    }

    /// The type name reported by `typeof`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Missing => "missing",
            Self::Logical(_) => "logical",
            Self::Int(_) => "integer",
            Self::Double(_) => "double",
            Self::Char(_) => "character",
            Self::List(_) => "list",
            Self::Expr(_) => "expr",
            Self::Promise(_) => "promise",
            Self::Dots(_) => "dots",
            Self::Builtin(_) | Self::Closure(_) => "function",
        }
    }

    /// The element count reported by `length`.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Null | Self::Missing => 0,
            Self::Logical(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::List(v) => v.len(),
            Self::Dots(d) => d.args.len(),
            Self::Expr(_) | Self::Promise(_) | Self::Builtin(_) | Self::Closure(_) => 1,
        }
    }

    /// Whether `length` reports zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads an attribute by name. Only vectors and lists carry attributes.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        let attrs = self.attrs()?;
        attrs.get(name).cloned()
    }

    /// The attribute map, if this value carries one.
    #[must_use]
    pub fn attrs(&self) -> Option<&Attributes> {
        match self {
            Self::Logical(v) => Some(&v.attrs),
            Self::Int(v) => Some(&v.attrs),
            Self::Double(v) => Some(&v.attrs),
            Self::Char(v) => Some(&v.attrs),
            Self::List(v) => Some(&v.attrs),
            _ => None,
        }
    }

    /// Sets (or with `None`, removes) an attribute, cloning the payload if
    /// it is shared. Values without attribute maps ignore the update.
    pub fn set_attr(&mut self, name: &str, value: Option<Value>) {
        fn update(attrs: &mut Attributes, name: &str, value: Option<Value>) {
            match value {
                Some(v) => {
                    attrs.insert(name.to_string(), v);
                },
                None => {
                    attrs.remove(name);
                },
            }
        }
        match self {
            Self::Logical(v) => update(&mut Rc::make_mut(v).attrs, name, value),
            Self::Int(v) => update(&mut Rc::make_mut(v).attrs, name, value),
            Self::Double(v) => update(&mut Rc::make_mut(v).attrs, name, value),
            Self::Char(v) => update(&mut Rc::make_mut(v).attrs, name, value),
            Self::List(v) => update(&mut Rc::make_mut(v).attrs, name, value),
            _ => {},
        }
    }
}

/// Renders a double the way printed output wants it: shortest round-trip
/// decimal form, with `NaN`, `Inf` and `-Inf` for the float specials.
#[must_use]
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    format!("{v}")
}

/// Joins rendered elements the way atomic vectors print: `c()` when empty,
/// the bare element when length 1, space-separated otherwise.
fn format_atomic(parts: &[String]) -> String {
    match parts.len() {
        0 => "c()".to_string(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Missing => write!(f, "<missing>"),
            Self::Logical(v) => {
                let parts: Vec<String> =
                    v.data
                     .iter()
                     .map(|e| match e {
                         Some(true) => "TRUE".to_string(),
                         Some(false) => "FALSE".to_string(),
                         None => "NA".to_string(),
                     })
                     .collect();
                write!(f, "{}", format_atomic(&parts))
            },
            Self::Int(v) => {
                let parts: Vec<String> = v.data
                                          .iter()
                                          .map(|e| match e {
                                              Some(i) => i.to_string(),
                                              None => "NA".to_string(),
                                          })
                                          .collect();
                write!(f, "{}", format_atomic(&parts))
            },
            Self::Double(v) => {
                let parts: Vec<String> = v.data
                                          .iter()
                                          .map(|e| match e {
                                              Some(d) => format_double(*d),
                                              None => "NA".to_string(),
                                          })
                                          .collect();
                write!(f, "{}", format_atomic(&parts))
            },
            Self::Char(v) => {
                let parts: Vec<String> = v.data
                                          .iter()
                                          .map(|e| match e {
                                              Some(s) => format!("{s:?}"),
                                              None => "NA".to_string(),
                                          })
                                          .collect();
                write!(f, "{}", format_atomic(&parts))
            },
            Self::List(v) => {
                if v.data.is_empty() {
                    return write!(f, "list()");
                }
                let parts: Vec<String> = v.data
                                          .iter()
                                          .enumerate()
                                          .map(|(i, e)| format!("[[{}]] {e}", i + 1))
                                          .collect();
                write!(f, "list(\n  {}\n)", parts.join(",\n  "))
            },
            Self::Expr(e) => write!(f, "expression({})", e.expr),
            Self::Promise(p) => match &*p.state.borrow() {
                PromiseState::Done(Ok(v)) => write!(f, "{v}"),
                _ => write!(f, "<promise>"),
            },
            Self::Dots(_) => write!(f, "<...>"),
            Self::Builtin(b) => write!(f, "<builtin:{}>", b.name),
            Self::Closure(_) => write!(f, "<function>"),
        }
    }
}
