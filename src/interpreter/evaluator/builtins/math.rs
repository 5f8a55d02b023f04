#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use crate::{
    interpreter::{
        evaluator::{
            builtins::{
                builtin_table, check_arity, get_named, install_table, invalid, na_rm,
                vector::alphabet,
            },
            coerce::{as_double_scalar, as_double_vec, as_logical_vec},
            core::{force, Context, EvalResult},
            env::Env,
        },
        value::core::{ArgValue, Value},
    },
};

builtin_table! {
    "abs"     => abs,
    "sqrt"    => sqrt,
    "floor"   => floor,
    "ceiling" => ceiling,
    "trunc"   => trunc,
    "round"   => round,
    "log"     => log,
    "log2"    => log2,
    "log10"   => log10,
    "exp"     => exp,
    "sin"     => sin,
    "cos"     => cos,
    "tan"     => tan,
    "asin"    => asin,
    "acos"    => acos,
    "atan"    => atan,
    "atan2"   => atan2,
    "sign"    => sign,
    "sum"     => sum,
    "mean"    => mean,
    "sd"      => sd,
    "prod"    => prod,
    "min"     => min,
    "max"     => max,
    "range"   => range,
    "any"     => any,
    "all"     => all,
    "cumsum"  => cumsum,
    "cumprod" => cumprod,
    "cummax"  => cummax,
    "cummin"  => cummin,
    "diff"    => diff,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);

    env.set_local("pi", Value::double_scalar(std::f64::consts::PI));
    env.set_local("Inf", Value::double_scalar(f64::INFINITY));
    env.set_local("NaN", Value::double_scalar(f64::NAN));
    // T and F are ordinary bindings; assigning to them shadows the
    // constants, as the reference dialect historically allows.
    env.set_local("T", Value::logical_scalar(true));
    env.set_local("F", Value::logical_scalar(false));
    env.set_local("LETTERS", alphabet(true));
    env.set_local("letters", alphabet(false));
}

/// Applies a unary `f64` function over a double-coerced vector; NA in, NA
/// out.
fn vec_math_unary(ctx: &Context,
                  args: &[ArgValue],
                  usage: &str,
                  f: impl Fn(f64) -> f64,
                  line: usize)
                  -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;
    Ok(Value::double_vec(dv.iter().map(|e| e.map(&f)).collect()))
}

fn abs(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "abs(x)", f64::abs, line)
}

fn sqrt(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "sqrt(x)", f64::sqrt, line)
}

fn floor(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "floor(x)", f64::floor, line)
}

fn ceiling(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "ceiling(x)", f64::ceil, line)
}

fn trunc(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "trunc(x)", f64::trunc, line)
}

/// `round(x, digits=0)`; digits may be given by name or position.
fn round(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("round(x) expects at least 1 argument", line));
    }
    let digits = scalar_option(ctx, args, "digits", 1, 0.0, line)?;
    let mult = 10f64.powi(digits as i32);
    vec_math_unary(ctx,
                   &args[..1],
                   "round(x)",
                   |x| (x * mult).round() / mult,
                   line)
}

/// `log(x, base=e)`; the base may be given by name or position.
fn log(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("log(x) expects at least 1 argument", line));
    }
    let base = scalar_option(ctx, args, "base", 1, std::f64::consts::E, line)?;
    if (base - std::f64::consts::E).abs() < f64::EPSILON {
        return vec_math_unary(ctx, &args[..1], "log(x)", f64::ln, line);
    }
    let log_base = base.ln();
    vec_math_unary(ctx, &args[..1], "log(x)", move |x| x.ln() / log_base, line)
}

fn log2(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "log2(x)", f64::log2, line)
}

fn log10(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "log10(x)", f64::log10, line)
}

fn exp(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "exp(x)", f64::exp, line)
}

fn sin(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "sin(x)", f64::sin, line)
}

fn cos(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "cos(x)", f64::cos, line)
}

fn tan(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "tan(x)", f64::tan, line)
}

fn asin(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "asin(x)", f64::asin, line)
}

fn acos(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "acos(x)", f64::acos, line)
}

fn atan(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx, args, "atan(x)", f64::atan, line)
}

/// `atan2(y, x)`: recycled binary.
fn atan2(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "atan2(y, x)", line)?;
    let y = force(ctx, args[0].value.clone())?;
    let x = force(ctx, args[1].value.clone())?;
    let yv = as_double_vec(ctx, &y, line)?;
    let xv = as_double_vec(ctx, &x, line)?;
    if yv.is_empty() || xv.is_empty() {
        return Ok(Value::double_vec(Vec::new()));
    }
    let n = yv.len().max(xv.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        match (yv[i % yv.len()], xv[i % xv.len()]) {
            (Some(a), Some(b)) => out.push(Some(a.atan2(b))),
            _ => out.push(None),
        }
    }
    Ok(Value::double_vec(out))
}

fn sign(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    vec_math_unary(ctx,
                   args,
                   "sign(x)",
                   |x| {
                       if x > 0.0 {
                           1.0
                       } else if x < 0.0 {
                           -1.0
                       } else {
                           0.0
                       }
                   },
                   line)
}

/// Reads a scalar option from a named argument or the given position,
/// with a default when absent or NA.
fn scalar_option(ctx: &Context,
                 args: &[ArgValue],
                 name: &str,
                 position: usize,
                 default: f64,
                 line: usize)
                 -> EvalResult<f64> {
    let arg = get_named(args, name).or_else(|| {
                                       args.get(position)
                                           .filter(|a| a.name.is_none())
                                           .map(|a| &a.value)
                                   });
    let Some(v) = arg else {
        return Ok(default);
    };
    let v = force(ctx, v.clone())?;
    Ok(as_double_scalar(ctx, &v, line)?.unwrap_or(default))
}

/// Collects the double elements of every non-`na.rm` argument.
fn reduction_elements(ctx: &Context,
                      args: &[ArgValue],
                      line: usize)
                      -> EvalResult<Vec<Option<f64>>> {
    let mut out = Vec::new();
    for a in args {
        if a.name.as_deref() == Some("na.rm") {
            continue;
        }
        let v = force(ctx, a.value.clone())?;
        out.extend(as_double_vec(ctx, &v, line)?);
    }
    Ok(out)
}

/// `sum(..., na.rm=FALSE)`; the empty sum is 0.
fn sum(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut total = 0.0;
    for e in reduction_elements(ctx, args, line)? {
        match e {
            Some(x) => total += x,
            None if rm => {},
            None => return Ok(Value::double_na()),
        }
    }
    Ok(Value::double_scalar(total))
}

/// `prod(..., na.rm=FALSE)`; the empty product is 1.
fn prod(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut total = 1.0;
    for e in reduction_elements(ctx, args, line)? {
        match e {
            Some(x) => total *= x,
            None if rm => {},
            None => return Ok(Value::double_na()),
        }
    }
    Ok(Value::double_scalar(total))
}

/// `mean(x, na.rm=FALSE)`.
fn mean(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("mean() expects at least 1 argument", line));
    }
    let rm = na_rm(ctx, args, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let mut total = 0.0;
    let mut n = 0usize;
    for e in as_double_vec(ctx, &v, line)? {
        match e {
            Some(x) => {
                total += x;
                n += 1;
            },
            None if rm => {},
            None => return Ok(Value::double_na()),
        }
    }
    if n == 0 {
        return Ok(Value::double_na());
    }
    Ok(Value::double_scalar(total / n as f64))
}

/// `sd(x, na.rm=FALSE)`: sample standard deviation (n-1 denominator).
fn sd(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("sd() expects at least 1 argument", line));
    }
    let rm = na_rm(ctx, args, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;

    let mut total = 0.0;
    let mut n = 0usize;
    for e in &dv {
        match e {
            Some(x) => {
                total += x;
                n += 1;
            },
            None if rm => {},
            None => return Ok(Value::double_na()),
        }
    }
    if n <= 1 {
        return Ok(Value::double_na());
    }
    let avg = total / n as f64;
    let mut variance = 0.0;
    for x in dv.iter().flatten() {
        let diff = x - avg;
        variance += diff * diff;
    }
    variance /= (n - 1) as f64;
    Ok(Value::double_scalar(variance.sqrt()))
}

fn extremum(ctx: &Context,
            args: &[ArgValue],
            want_max: bool,
            line: usize)
            -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut best = if want_max {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    for e in reduction_elements(ctx, args, line)? {
        match e {
            Some(x) => {
                if (want_max && x > best) || (!want_max && x < best) {
                    best = x;
                }
            },
            None if rm => {},
            None => return Ok(Value::double_na()),
        }
    }
    Ok(Value::double_scalar(best))
}

/// `max(..., na.rm=FALSE)`; empty input yields `-Inf`.
fn max(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    extremum(ctx, args, true, line)
}

/// `min(..., na.rm=FALSE)`; empty input yields `Inf`.
fn min(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    extremum(ctx, args, false, line)
}

/// `range(..., na.rm=FALSE)`: the min and max as a length-2 double.
fn range(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for e in reduction_elements(ctx, args, line)? {
        match e {
            Some(x) => {
                lo = lo.min(x);
                hi = hi.max(x);
            },
            None if rm => {},
            None => return Ok(Value::double_vec(vec![None, None])),
        }
    }
    Ok(Value::double_vec(vec![Some(lo), Some(hi)]))
}

/// `any(..., na.rm=FALSE)`: TRUE as soon as one element is TRUE; an NA
/// that could have been TRUE yields NA.
fn any(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut saw_na = false;
    for a in args {
        if a.name.as_deref() == Some("na.rm") {
            continue;
        }
        let v = force(ctx, a.value.clone())?;
        for e in as_logical_vec(ctx, &v, line)? {
            match e {
                Some(true) => return Ok(Value::logical_scalar(true)),
                Some(false) => {},
                None => {
                    if !rm {
                        saw_na = true;
                    }
                },
            }
        }
    }
    if saw_na {
        return Ok(Value::logical_na());
    }
    Ok(Value::logical_scalar(false))
}

/// `all(..., na.rm=FALSE)`: FALSE as soon as one element is FALSE; an NA
/// that could have been FALSE yields NA.
fn all(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let rm = na_rm(ctx, args, line)?;
    let mut saw_na = false;
    for a in args {
        if a.name.as_deref() == Some("na.rm") {
            continue;
        }
        let v = force(ctx, a.value.clone())?;
        for e in as_logical_vec(ctx, &v, line)? {
            match e {
                Some(false) => return Ok(Value::logical_scalar(false)),
                Some(true) => {},
                None => {
                    if !rm {
                        saw_na = true;
                    }
                },
            }
        }
    }
    if saw_na {
        return Ok(Value::logical_na());
    }
    Ok(Value::logical_scalar(true))
}

/// A cumulative scan; once an NA is hit every following output is NA.
fn cumulative(ctx: &Context,
              args: &[ArgValue],
              usage: &str,
              init: f64,
              f: impl Fn(f64, f64) -> f64,
              line: usize)
              -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;
    let mut out = Vec::with_capacity(dv.len());
    let mut acc = init;
    let mut poisoned = false;
    for e in &dv {
        if poisoned {
            out.push(None);
            continue;
        }
        match e {
            Some(x) => {
                acc = f(acc, *x);
                out.push(Some(acc));
            },
            None => {
                poisoned = true;
                out.push(None);
            },
        }
    }
    Ok(Value::double_vec(out))
}

fn cumsum(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    cumulative(ctx, args, "cumsum(x)", 0.0, |acc, x| acc + x, line)
}

fn cumprod(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    cumulative(ctx, args, "cumprod(x)", 1.0, |acc, x| acc * x, line)
}

fn cummax(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    cumulative(ctx, args, "cummax(x)", f64::NEG_INFINITY, f64::max, line)
}

fn cummin(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    cumulative(ctx, args, "cummin(x)", f64::INFINITY, f64::min, line)
}

/// `diff(x, lag=1)`: lagged differences; a lag outside `1..length(x)-1`
/// yields an empty double.
fn diff(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("diff(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;
    let lag = scalar_option(ctx, args, "lag", 1, 1.0, line)? as i64;
    if lag < 1 || lag as usize >= dv.len() {
        return Ok(Value::double_vec(Vec::new()));
    }
    let lag = lag as usize;
    let mut out = Vec::with_capacity(dv.len() - lag);
    for i in 0..dv.len() - lag {
        match (dv[i], dv[i + lag]) {
            (Some(a), Some(b)) => out.push(Some(b - a)),
            _ => out.push(None),
        }
    }
    Ok(Value::double_vec(out))
}
