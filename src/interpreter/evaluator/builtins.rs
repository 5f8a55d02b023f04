use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            coerce::as_logical_scalar,
            core::{force, Context, EvalResult, Signal},
            env::Env,
        },
        value::core::{ArgValue, BuiltinImpl, Value},
    },
};

/// The apply family: `lapply`, `sapply`, `vapply`, `Map`, `Reduce`,
/// `Filter` and `do.call`.
pub mod apply;
/// Control and error handling: `ifelse`, `switch`, `tryCatch`, `stop`,
/// `nargs`.
pub mod control;
/// Data-frame construction and helpers.
pub mod frame;
/// Coercion, type predicates and introspection.
pub mod inspect;
/// Vectorized math, reductions, cumulatives and the numeric constants.
pub mod math;
/// Output builtins: `print`, `cat`, `str`, `warning`, `message`.
pub mod output;
/// String builtins (substring semantics for the pattern functions).
pub mod strings;
/// Vector construction and utilities.
pub mod vector;

/// Declares a builtin lookup table mapping installed names to their
/// implementations.
macro_rules! builtin_table {
    ($( $name:literal => $func:path ),* $(,)?) => {
        pub(crate) const TABLE: &[(&'static str,
                                   crate::interpreter::value::core::BuiltinImpl)] = &[
            $(($name, $func),)*
        ];
    };
}
pub(crate) use builtin_table;

/// Installs the whole builtin library into an environment. Called once per
/// context, on the fresh global frame.
pub(crate) fn install_builtins(env: &Env) {
    output::install(env);
    vector::install(env);
    math::install(env);
    strings::install(env);
    inspect::install(env);
    apply::install(env);
    control::install(env);
    frame::install(env);
}

/// Installs one table of builtins.
pub(crate) fn install_table(env: &Env, table: &[(&'static str, BuiltinImpl)]) {
    for &(name, imp) in table {
        env.set_local(name, Value::builtin(name, imp));
    }
}

/// Forces every argument value; the forms most builtins start from.
pub(crate) fn force_args(ctx: &Context, args: &[ArgValue]) -> EvalResult<Vec<ArgValue>> {
    args.iter()
        .map(|a| {
            Ok(ArgValue { name:  a.name.clone(),
                          value: force(ctx, a.value.clone())?, })
        })
        .collect()
}

/// Looks up an argument by name, unforced.
pub(crate) fn get_named<'a>(args: &'a [ArgValue], name: &str) -> Option<&'a Value> {
    args.iter()
        .find(|a| a.name.as_deref() == Some(name))
        .map(|a| &a.value)
}

/// Resolves the conventional `na.rm` option; absent or NA means false.
pub(crate) fn na_rm(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<bool> {
    let Some(v) = get_named(args, "na.rm") else {
        return Ok(false);
    };
    let v = force(ctx, v.clone())?;
    Ok(as_logical_scalar(ctx, &v, line)?.unwrap_or(false))
}

/// An argument-validation error with the given details.
pub(crate) fn invalid(details: impl Into<String>, line: usize) -> Signal {
    RuntimeError::InvalidArgument { details: details.into(),
                                    line }.into()
}

/// Rejects a call whose argument count is not exactly `n`.
pub(crate) fn check_arity(args: &[ArgValue],
                          n: usize,
                          usage: &str,
                          line: usize)
                          -> EvalResult<()> {
    if args.len() == n {
        return Ok(());
    }
    let plural = if n == 1 { "argument" } else { "arguments" };
    Err(invalid(format!("{usage} expects {n} {plural}"), line))
}
