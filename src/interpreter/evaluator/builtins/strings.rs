#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, get_named, install_table, invalid},
            coerce::{as_char_vec, as_double_scalar, render_elements},
            core::{force, Context, EvalResult},
            env::Env,
        },
        value::core::{format_double, ArgValue, Value},
    },
};

builtin_table! {
    "paste"      => paste,
    "paste0"     => paste0,
    "nchar"      => nchar,
    "substr"     => substr,
    "substring"  => substr,
    "toupper"    => toupper,
    "tolower"    => tolower,
    "trimws"     => trimws,
    "startsWith" => starts_with,
    "endsWith"   => ends_with,
    "grep"       => grep,
    "grepl"      => grepl,
    "sub"        => sub,
    "gsub"       => gsub,
    "strsplit"   => strsplit,
    "sprintf"    => sprintf,
    "format"     => format_value,
    "chartr"     => chartr,
    "strrep"     => strrep,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

fn paste(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    paste_impl(ctx, args, " ", line)
}

fn paste0(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    paste_impl(ctx, args, "", line)
}

/// Elementwise paste with recycling; `sep` joins the arguments of one
/// element, `collapse` (when given) joins the elements into one string.
fn paste_impl(ctx: &Context,
              args: &[ArgValue],
              default_sep: &str,
              line: usize)
              -> EvalResult<Value> {
    let mut sep = default_sep.to_string();
    let mut collapse = None;

    if let Some(v) = get_named(args, "sep") {
        if let Value::Char(c) = force(ctx, v.clone())? {
            if let Some(Some(s)) = c.data.first() {
                sep = s.clone();
            }
        }
    }
    if let Some(v) = get_named(args, "collapse") {
        if let Value::Char(c) = force(ctx, v.clone())? {
            if let Some(Some(s)) = c.data.first() {
                collapse = Some(s.clone());
            }
        }
    }

    let mut vecs: Vec<Vec<String>> = Vec::new();
    let mut max_len = 0;
    for a in args {
        if matches!(a.name.as_deref(), Some("sep" | "collapse")) {
            continue;
        }
        let v = force(ctx, a.value.clone())?;
        let strs = render_elements(&v);
        max_len = max_len.max(strs.len());
        vecs.push(strs);
    }
    let _ = line;

    if vecs.is_empty() {
        return Ok(Value::char_scalar(""));
    }

    let mut result = Vec::with_capacity(max_len);
    for i in 0..max_len {
        let parts: Vec<&str> = vecs.iter()
                                   .map(|vec| {
                                       if vec.is_empty() {
                                           ""
                                       } else {
                                           vec[i % vec.len()].as_str()
                                       }
                                   })
                                   .collect();
        result.push(parts.join(&sep));
    }

    if let Some(collapse) = collapse {
        return Ok(Value::char_scalar(result.join(&collapse)));
    }
    Ok(Value::char_vec(result.into_iter().map(Some).collect()))
}

/// Character counts (in characters, not bytes).
fn nchar(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("nchar(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let cv = as_char_vec(ctx, &v, line)?;
    let out = cv.iter()
                .map(|e| e.as_ref().map(|s| s.chars().count() as i64))
                .collect();
    Ok(Value::int_vec(out))
}

/// `substr(x, start, stop)`: 1-based inclusive character range, clamped.
fn substr(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 3 {
        return Err(invalid("substr(x, start, stop) expects 3 arguments", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let cv = as_char_vec(ctx, &x, line)?;
    let start_v = force(ctx, args[1].value.clone())?;
    let stop_v = force(ctx, args[2].value.clone())?;
    let (Some(start), Some(stop)) = (as_double_scalar(ctx, &start_v, line)?,
                                     as_double_scalar(ctx, &stop_v, line)?)
    else {
        return Ok(Value::char_na());
    };
    let start = (start as i64 - 1).max(0) as usize;
    let stop = stop as i64;

    let out = cv.iter()
                .map(|e| {
                    e.as_ref().map(|s| {
                                  let chars: Vec<char> = s.chars().collect();
                                  let hi = (stop.max(0) as usize).min(chars.len());
                                  if start >= hi {
                                      String::new()
                                  } else {
                                      chars[start..hi].iter().collect()
                                  }
                              })
                })
                .collect();
    Ok(Value::char_vec(out))
}

fn case_map(ctx: &Context,
            args: &[ArgValue],
            usage: &str,
            f: impl Fn(&str) -> String,
            line: usize)
            -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let cv = as_char_vec(ctx, &v, line)?;
    Ok(Value::char_vec(cv.iter()
                         .map(|e| e.as_ref().map(|s| f(s)))
                         .collect()))
}

fn toupper(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    case_map(ctx, args, "toupper(x)", str::to_uppercase, line)
}

fn tolower(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    case_map(ctx, args, "tolower(x)", str::to_lowercase, line)
}

/// `trimws(x, which = "both" | "left" | "right")`.
fn trimws(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("trimws(x) expects at least 1 argument", line));
    }
    let mut which = "both".to_string();
    if let Some(v) = get_named(args, "which") {
        if let Value::Char(c) = force(ctx, v.clone())? {
            if let Some(Some(s)) = c.data.first() {
                which = s.clone();
            }
        }
    }
    let v = force(ctx, args[0].value.clone())?;
    let cv = as_char_vec(ctx, &v, line)?;
    let out = cv.iter()
                .map(|e| {
                    e.as_ref().map(|s| {
                                  match which.as_str() {
                                      "left" => s.trim_start().to_string(),
                                      "right" => s.trim_end().to_string(),
                                      _ => s.trim().to_string(),
                                  }
                              })
                })
                .collect();
    Ok(Value::char_vec(out))
}

fn affix_test(ctx: &Context,
              args: &[ArgValue],
              usage: &str,
              f: impl Fn(&str, &str) -> bool,
              line: usize)
              -> EvalResult<Value> {
    check_arity(args, 2, usage, line)?;
    let x = force(ctx, args[0].value.clone())?;
    let affix = force(ctx, args[1].value.clone())?;
    let xv = as_char_vec(ctx, &x, line)?;
    let av = as_char_vec(ctx, &affix, line)?;
    if xv.is_empty() || av.is_empty() {
        return Ok(Value::logical_vec(Vec::new()));
    }
    let n = xv.len().max(av.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        match (&xv[i % xv.len()], &av[i % av.len()]) {
            (Some(s), Some(a)) => out.push(Some(f(s, a))),
            _ => out.push(None),
        }
    }
    Ok(Value::logical_vec(out))
}

fn starts_with(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    affix_test(ctx, args, "startsWith(x, prefix)", |s, p| s.starts_with(p), line)
}

fn ends_with(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    affix_test(ctx, args, "endsWith(x, suffix)", |s, p| s.ends_with(p), line)
}

fn pattern_of(ctx: &Context, arg: &ArgValue, usage: &str, line: usize) -> EvalResult<String> {
    let v = force(ctx, arg.value.clone())?;
    if let Value::Char(c) = &v {
        if let Some(Some(s)) = c.data.first() {
            return Ok(s.clone());
        }
    }
    Err(invalid(format!("{usage}: invalid pattern"), line))
}

/// `grep(pattern, x, value=FALSE)`: matching indices, or the matching
/// elements with `value=TRUE`. Substring matching, not regular
/// expressions.
fn grep(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("grep(pattern, x) expects at least 2 arguments", line));
    }
    let pattern = pattern_of(ctx, &args[0], "grep", line)?;
    let x = force(ctx, args[1].value.clone())?;
    let xv = as_char_vec(ctx, &x, line)?;

    let value_mode = match get_named(args, "value") {
        Some(v) => {
            let v = force(ctx, v.clone())?;
            crate::interpreter::evaluator::coerce::as_logical_scalar(ctx, &v, line)?
                .unwrap_or(false)
        },
        None => false,
    };

    if value_mode {
        let out = xv.iter()
                    .flatten()
                    .filter(|s| s.contains(&pattern))
                    .map(|s| Some(s.clone()))
                    .collect();
        return Ok(Value::char_vec(out));
    }
    let out = xv.iter()
                .enumerate()
                .filter(|(_, e)| e.as_ref().is_some_and(|s| s.contains(&pattern)))
                .map(|(i, _)| Some(i as i64 + 1))
                .collect();
    Ok(Value::int_vec(out))
}

/// `grepl(pattern, x)`: logical vector of substring containment.
fn grepl(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("grepl(pattern, x) expects at least 2 arguments", line));
    }
    let pattern = pattern_of(ctx, &args[0], "grepl", line)?;
    let x = force(ctx, args[1].value.clone())?;
    let xv = as_char_vec(ctx, &x, line)?;
    let out = xv.iter()
                .map(|e| e.as_ref().map(|s| s.contains(&pattern)))
                .collect();
    Ok(Value::logical_vec(out))
}

fn replace_impl(ctx: &Context,
                args: &[ArgValue],
                usage: &str,
                all: bool,
                line: usize)
                -> EvalResult<Value> {
    if args.len() < 3 {
        return Err(invalid(format!("{usage} expects 3 arguments"), line));
    }
    let pat = force(ctx, args[0].value.clone())?;
    let repl = force(ctx, args[1].value.clone())?;
    let x = force(ctx, args[2].value.clone())?;
    let pats = render_elements(&pat);
    let repls = render_elements(&repl);
    let (Some(pattern), Some(replacement)) = (pats.first(), repls.first()) else {
        return Err(invalid(format!("{usage}: invalid arguments"), line));
    };
    let cv = as_char_vec(ctx, &x, line)?;
    let out = cv.iter()
                .map(|e| {
                    e.as_ref().map(|s| {
                                  if all {
                                      s.replace(pattern.as_str(), replacement)
                                  } else {
                                      s.replacen(pattern.as_str(), replacement, 1)
                                  }
                              })
                })
                .collect();
    Ok(Value::char_vec(out))
}

/// `sub(pattern, replacement, x)`: first occurrence only.
fn sub(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    replace_impl(ctx, args, "sub(pattern, replacement, x)", false, line)
}

/// `gsub(pattern, replacement, x)`: every occurrence.
fn gsub(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    replace_impl(ctx, args, "gsub(pattern, replacement, x)", true, line)
}

/// `strsplit(x, split)`: a list of character vectors.
fn strsplit(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("strsplit(x, split) expects 2 arguments", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let split_v = force(ctx, args[1].value.clone())?;
    let cv = as_char_vec(ctx, &x, line)?;
    let splits = render_elements(&split_v);
    let Some(split) = splits.first() else {
        return Err(invalid("strsplit: invalid split", line));
    };

    let out = cv.iter()
                .map(|e| match e {
                    None => Value::char_na(),
                    Some(s) => {
                        let parts = s.split(split.as_str())
                                     .map(|p| Some(p.to_string()))
                                     .collect();
                        Value::char_vec(parts)
                    },
                })
                .collect();
    Ok(Value::list(out))
}

/// `sprintf(fmt, ...)` over a small verb set: `%s`, `%d`/`%i`, `%f`,
/// `%e`, `%g` and `%%`, with optional `-`/`0` flags, width and precision.
fn sprintf(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("sprintf(fmt, ...) expects at least 1 argument", line));
    }
    let fmt = pattern_of(ctx, &args[0], "sprintf", line)
        .map_err(|_| invalid("sprintf: invalid format string", line))?;

    let mut values = Vec::new();
    for a in &args[1..] {
        values.push(force(ctx, a.value.clone())?);
    }

    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    let mut next_arg = 0usize;
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let mut left = false;
        let mut zero = false;
        while let Some(&f) = chars.peek() {
            match f {
                '-' => left = true,
                '0' => zero = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width * 10 + d as usize;
            chars.next();
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p * 10 + d as usize;
                chars.next();
            }
            precision = Some(p);
        }
        let Some(verb) = chars.next() else {
            return Err(invalid("sprintf: truncated format directive", line));
        };
        let Some(value) = values.get(next_arg) else {
            return Err(invalid("sprintf: too few arguments", line));
        };
        next_arg += 1;

        let rendered = format_verb(ctx, verb, value, precision, line)?;
        out.push_str(&pad(&rendered, width, left, zero));
    }
    Ok(Value::char_scalar(out))
}

fn format_verb(ctx: &Context,
               verb: char,
               value: &Value,
               precision: Option<usize>,
               line: usize)
               -> EvalResult<String> {
    let scalar_num = |v: &Value| -> EvalResult<Option<f64>> { as_double_scalar(ctx, v, line) };
    match verb {
        's' => Ok(render_elements(value).join(" ")),
        'd' | 'i' => match scalar_num(value)? {
            Some(x) => Ok(format!("{}", x.trunc() as i64)),
            None => Ok("NA".to_string()),
        },
        'f' => match scalar_num(value)? {
            Some(x) => Ok(format!("{x:.prec$}", prec = precision.unwrap_or(6))),
            None => Ok("NA".to_string()),
        },
        'e' => match scalar_num(value)? {
            Some(x) => Ok(format!("{x:.prec$e}", prec = precision.unwrap_or(6))),
            None => Ok("NA".to_string()),
        },
        'g' => match scalar_num(value)? {
            Some(x) => Ok(format_double(x)),
            None => Ok("NA".to_string()),
        },
        other => Err(invalid(format!("sprintf: unsupported verb %{other}"), line)),
    }
}

fn pad(s: &str, width: usize, left: bool, zero: bool) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let fill = if zero && !left { '0' } else { ' ' };
    let padding: String = std::iter::repeat(fill).take(width - len).collect();
    if left {
        format!("{s}{padding}")
    } else if zero {
        // Zero padding goes after a sign.
        if let Some(rest) = s.strip_prefix('-') {
            format!("-{padding}{rest}")
        } else {
            format!("{padding}{s}")
        }
    } else {
        format!("{padding}{s}")
    }
}

/// `format(x)`: the character rendering of each element.
fn format_value(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("format(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    match as_char_vec(ctx, &v, line) {
        Ok(cv) => Ok(Value::char_vec(cv)),
        Err(_) => Ok(Value::char_scalar(v.to_string())),
    }
}

/// `chartr(old, new, x)`: per-character translation; `old` and `new` must
/// have equal length.
fn chartr(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 3, "chartr(old, new, x)", line)?;
    let old_v = force(ctx, args[0].value.clone())?;
    let new_v = force(ctx, args[1].value.clone())?;
    let x = force(ctx, args[2].value.clone())?;
    let olds = render_elements(&old_v);
    let news = render_elements(&new_v);
    let (Some(old), Some(new)) = (olds.first(), news.first()) else {
        return Err(invalid("chartr: invalid arguments", line));
    };
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    if old_chars.len() != new_chars.len() {
        return Err(invalid("chartr: old and new must have the same length", line));
    }
    let translation: std::collections::HashMap<char, char> =
        old_chars.into_iter().zip(new_chars).collect();

    let cv = as_char_vec(ctx, &x, line)?;
    let out = cv.iter()
                .map(|e| {
                    e.as_ref().map(|s| {
                                  s.chars()
                                   .map(|c| translation.get(&c).copied().unwrap_or(c))
                                   .collect::<String>()
                              })
                })
                .collect();
    Ok(Value::char_vec(out))
}

/// `strrep(x, times)`.
fn strrep(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "strrep(x, times)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let times_v = force(ctx, args[1].value.clone())?;
    let cv = as_char_vec(ctx, &x, line)?;
    let Some(times) = as_double_scalar(ctx, &times_v, line)? else {
        return Ok(Value::char_na());
    };
    if times < 0.0 {
        return Err(invalid("strrep: invalid times argument", line));
    }
    let times = times as usize;
    let out = cv.iter()
                .map(|e| e.as_ref().map(|s| s.repeat(times)))
                .collect();
    Ok(Value::char_vec(out))
}
