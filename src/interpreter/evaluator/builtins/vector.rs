#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;

use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, force_args, get_named, install_table, invalid},
            coerce::{
                as_char_vec, as_double_scalar, as_double_vec, as_int_vec, as_logical_scalar,
                as_logical_vec, render_elements,
            },
            core::{force, Context, EvalResult},
            env::Env,
        },
        value::core::{ArgValue, CharVec, Value},
    },
};

use std::rc::Rc;

builtin_table! {
    "c"          => concat,
    "list"       => list,
    "rep"        => rep,
    "seq"        => seq,
    "seq_len"    => seq_len,
    "seq_along"  => seq_along,
    "rev"        => rev,
    "sort"       => sort,
    "order"      => order,
    "unique"     => unique,
    "duplicated" => duplicated,
    "table"      => table,
    "match"      => match_positions,
    "append"     => append,
    "which"      => which,
    "which.min"  => which_min,
    "which.max"  => which_max,
    "which.na"   => which_na,
    "tabulate"   => tabulate,
    "union"      => set_union,
    "intersect"  => set_intersect,
    "setdiff"    => set_diff,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

/// Type-widening concatenation: logical < integer < double < character.
/// Any list (or otherwise non-atomic) argument makes the result a list.
pub(crate) fn concat(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let fargs = force_args(ctx, args)?;

    let mut target = "logical";
    let mut has_list = false;
    for a in &fargs {
        match a.value.type_name() {
            "character" => target = "character",
            "double" => {
                if target != "character" {
                    target = "double";
                }
            },
            "integer" => {
                if target != "character" && target != "double" {
                    target = "integer";
                }
            },
            "logical" => {},
            _ => has_list = true,
        }
    }

    if has_list {
        let mut out = Vec::new();
        for a in &fargs {
            match &a.value {
                Value::List(l) => out.extend(l.data.iter().cloned()),
                other => out.push(other.clone()),
            }
        }
        return Ok(Value::list(out));
    }

    match target {
        "character" => {
            let mut out = Vec::new();
            for a in &fargs {
                out.extend(as_char_vec(ctx, &a.value, line)?);
            }
            Ok(Value::char_vec(out))
        },
        "double" => {
            let mut out = Vec::new();
            for a in &fargs {
                out.extend(as_double_vec(ctx, &a.value, line)?);
            }
            Ok(Value::double_vec(out))
        },
        "integer" => {
            let mut out = Vec::new();
            for a in &fargs {
                out.extend(as_int_vec(ctx, &a.value, line)?);
            }
            Ok(Value::int_vec(out))
        },
        _ => {
            let mut out = Vec::new();
            for a in &fargs {
                out.extend(as_logical_vec(ctx, &a.value, line)?);
            }
            Ok(Value::logical_vec(out))
        },
    }
}

/// Builds a list; argument names land in the `names` attribute (empty
/// strings for unnamed positions).
fn list(ctx: &Context, args: &[ArgValue], _line: usize) -> EvalResult<Value> {
    let fargs = force_args(ctx, args)?;
    let data: Vec<Value> = fargs.iter().map(|a| a.value.clone()).collect();
    let names: Vec<Option<String>> = fargs.iter()
                                          .map(|a| Some(a.name.clone().unwrap_or_default()))
                                          .collect();
    let mut out = Value::list(data);
    out.set_attr("names", Some(Value::Char(Rc::new(CharVec::new(names)))));
    Ok(out)
}

/// `rep(x, times)`: the whole vector repeated end to end.
fn rep(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("rep() expects x and times", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let times_v = force(ctx, args[1].value.clone())?;
    let Some(times) = as_double_scalar(ctx, &times_v, line)? else {
        return Ok(Value::double_na());
    };
    if times < 0.0 {
        return Err(invalid("invalid 'times' argument", line));
    }
    let times = times as usize;

    fn cycle<T: Clone>(data: &[T], times: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(data.len() * times);
        for _ in 0..times {
            out.extend(data.iter().cloned());
        }
        out
    }

    match &x {
        Value::Double(v) => Ok(Value::double_vec(cycle(&v.data, times))),
        Value::Int(v) => Ok(Value::int_vec(cycle(&v.data, times))),
        Value::Logical(v) => Ok(Value::logical_vec(cycle(&v.data, times))),
        Value::Char(v) => Ok(Value::char_vec(cycle(&v.data, times))),
        Value::List(l) => Ok(Value::list(cycle(&l.data, times))),
        other => Err(invalid(format!("rep() unsupported type {}", other.type_name()), line)),
    }
}

/// `seq(to)` / `seq(from=, to=, by=)`. One unnamed argument means `1..n`;
/// otherwise only the named `from`, `to` and `by` are honored. A missing
/// `to` and a zero `by` are errors, and absurd lengths are rejected.
fn seq(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let mut from = 1.0;
    let mut to = 0.0;
    let mut by = 1.0;
    let mut has_to = false;

    if args.len() == 1 && args[0].name.is_none() {
        let v = force(ctx, args[0].value.clone())?;
        let Some(x) = as_double_scalar(ctx, &v, line)? else {
            return Ok(Value::double_na());
        };
        to = x;
        has_to = true;
    } else {
        for a in args {
            let Some(name) = a.name.as_deref() else {
                continue;
            };
            if !matches!(name, "from" | "to" | "by") {
                continue;
            }
            let v = force(ctx, a.value.clone())?;
            let Some(x) = as_double_scalar(ctx, &v, line)? else {
                return Ok(Value::double_na());
            };
            match name {
                "from" => from = x,
                "to" => {
                    to = x;
                    has_to = true;
                },
                _ => by = x,
            }
        }
    }

    if !has_to {
        return Err(invalid("seq() missing 'to'", line));
    }
    if by == 0.0 {
        return Err(invalid("seq() by must be non-zero", line));
    }
    let n = ((to - from) / by + 1.0).abs();
    if n > 1_000_000.0 {
        return Err(invalid("seq() too long", line));
    }

    let mut out = Vec::new();
    if (by > 0.0 && from > to) || (by < 0.0 && from < to) {
        return Ok(Value::double_vec(out));
    }
    let mut cur = from;
    while !((by > 0.0 && cur > to) || (by < 0.0 && cur < to)) {
        out.push(Some(cur));
        cur += by;
    }
    Ok(Value::double_vec(out))
}

/// `seq_len(n)`: the integers `1..n`.
fn seq_len(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "seq_len(n)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    let Some(n) = as_double_scalar(ctx, &v, line)? else {
        return Ok(Value::int_na());
    };
    if n < 0.0 {
        return Err(invalid("seq_len: argument must be non-negative", line));
    }
    Ok(Value::int_vec((1..=n as i64).map(Some).collect()))
}

/// `seq_along(x)`: the integers `1..length(x)`.
fn seq_along(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "seq_along(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    Ok(Value::int_vec((1..=v.len() as i64).map(Some).collect()))
}

/// Reverses element order, preserving type.
fn rev(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "rev(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    fn reversed<T: Clone>(data: &[T]) -> Vec<T> {
        data.iter().rev().cloned().collect()
    }
    match &v {
        Value::Double(d) => Ok(Value::double_vec(reversed(&d.data))),
        Value::Int(d) => Ok(Value::int_vec(reversed(&d.data))),
        Value::Logical(d) => Ok(Value::logical_vec(reversed(&d.data))),
        Value::Char(d) => Ok(Value::char_vec(reversed(&d.data))),
        Value::List(l) => Ok(Value::list(reversed(&l.data))),
        other => Err(invalid(format!("rev: unsupported type {}", other.type_name()), line)),
    }
}

/// `sort(x, decreasing=FALSE)`; NA elements are dropped.
fn sort(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("sort(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let decreasing = decreasing_option(ctx, args, line)?;

    match &v {
        Value::Double(d) => {
            let mut out: Vec<f64> = d.data.iter().flatten().copied().collect();
            out.sort_by(|a, b| a.total_cmp(b));
            if decreasing {
                out.reverse();
            }
            Ok(Value::double_vec(out.into_iter().map(Some).collect()))
        },
        Value::Int(d) => {
            let mut out: Vec<i64> = d.data.iter().flatten().copied().collect();
            out.sort_unstable();
            if decreasing {
                out.reverse();
            }
            Ok(Value::int_vec(out.into_iter().map(Some).collect()))
        },
        Value::Char(d) => {
            let mut out: Vec<String> = d.data.iter().flatten().cloned().collect();
            out.sort();
            if decreasing {
                out.reverse();
            }
            Ok(Value::char_vec(out.into_iter().map(Some).collect()))
        },
        other => Err(invalid(format!("sort: unsupported type {}", other.type_name()), line)),
    }
}

fn decreasing_option(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<bool> {
    let Some(d) = get_named(args, "decreasing") else {
        return Ok(false);
    };
    let d = force(ctx, d.clone())?;
    Ok(as_logical_scalar(ctx, &d, line)?.unwrap_or(false))
}

/// `order(x, decreasing=FALSE)`: the permutation that sorts `x`; NA
/// positions sort last.
fn order(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("order(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let decreasing = decreasing_option(ctx, args, line)?;
    let dv = as_double_vec(ctx, &v, line)?;
    let mut indices: Vec<usize> = (0..dv.len()).collect();
    indices.sort_by(|&i, &j| match (dv[i], dv[j]) {
               (None, _) => std::cmp::Ordering::Greater,
               (_, None) => std::cmp::Ordering::Less,
               (Some(a), Some(b)) => {
                   if decreasing {
                       b.total_cmp(&a)
                   } else {
                       a.total_cmp(&b)
                   }
               },
           });
    Ok(Value::int_vec(indices.into_iter()
                             .map(|i| Some(i as i64 + 1))
                             .collect()))
}

/// Keeps the first occurrence of every distinct element (including a
/// single NA).
fn unique(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "unique(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;

    fn dedup<T: Clone, K: std::hash::Hash + Eq>(data: &[Option<T>],
                                                key: impl Fn(&T) -> K)
                                                -> Vec<Option<T>> {
        let mut seen = HashSet::new();
        let mut seen_na = false;
        let mut out = Vec::new();
        for e in data {
            match e {
                None => {
                    if !seen_na {
                        seen_na = true;
                        out.push(None);
                    }
                },
                Some(x) => {
                    if seen.insert(key(x)) {
                        out.push(Some(x.clone()));
                    }
                },
            }
        }
        out
    }

    match &v {
        Value::Double(d) => Ok(Value::double_vec(dedup(&d.data, |x| OrderedFloat(*x)))),
        Value::Int(d) => Ok(Value::int_vec(dedup(&d.data, |x| *x))),
        Value::Char(d) => Ok(Value::char_vec(dedup(&d.data, Clone::clone))),
        Value::Logical(d) => Ok(Value::logical_vec(dedup(&d.data, |x| *x))),
        other => Err(invalid(format!("unique: unsupported type {}", other.type_name()), line)),
    }
}

/// TRUE for every element that already occurred earlier, keyed by
/// rendering.
fn duplicated(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "duplicated(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    let mut seen = HashSet::new();
    let out = render_elements(&v).into_iter()
                                 .map(|s| Some(!seen.insert(s)))
                                 .collect();
    Ok(Value::logical_vec(out))
}

/// Counts of the stringified values, as a named integer vector with
/// sorted keys.
fn table(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("table(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let mut counts: HashMap<String, i64> = HashMap::new();
    for s in render_elements(&v) {
        *counts.entry(s).or_insert(0) += 1;
    }
    let mut keys: Vec<String> = counts.keys().cloned().collect();
    keys.sort();

    let data: Vec<Option<i64>> = keys.iter().map(|k| Some(counts[k])).collect();
    let names: Vec<Option<String>> = keys.into_iter().map(Some).collect();
    let mut out = Value::int_vec(data);
    out.set_attr("names", Some(Value::Char(Rc::new(CharVec::new(names)))));
    Ok(out)
}

/// `match(x, table)`: first 1-based positions of `x`'s elements in the
/// table, NA when absent.
fn match_positions(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("match(x, table) expects 2 arguments", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let table = force(ctx, args[1].value.clone())?;
    let mut lookup: HashMap<String, i64> = HashMap::new();
    for (i, s) in render_elements(&table).into_iter().enumerate() {
        lookup.entry(s).or_insert(i as i64 + 1);
    }
    let out = render_elements(&x).into_iter()
                                 .map(|s| lookup.get(&s).copied())
                                 .collect();
    Ok(Value::int_vec(out))
}

/// `append(x, values)`: concatenation through `c()`.
fn append(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("append(x, values) expects at least 2 arguments", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let values = force(ctx, args[1].value.clone())?;
    concat(ctx,
           &[ArgValue { name:  None,
                        value: x, },
             ArgValue { name:  None,
                        value: values, }],
           line)
}

/// 1-based positions of the TRUE elements.
fn which(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "which(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    let lv = as_logical_vec(ctx, &v, line)?;
    let out = lv.iter()
                .enumerate()
                .filter(|(_, e)| **e == Some(true))
                .map(|(i, _)| Some(i as i64 + 1))
                .collect();
    Ok(Value::int_vec(out))
}

fn which_extreme(ctx: &Context,
                 args: &[ArgValue],
                 usage: &str,
                 want_max: bool,
                 line: usize)
                 -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;
    let mut best: Option<(usize, f64)> = None;
    for (i, e) in dv.iter().enumerate() {
        let Some(x) = e else { continue };
        let better = match best {
            None => true,
            Some((_, b)) => {
                if want_max {
                    *x > b
                } else {
                    *x < b
                }
            },
        };
        if better {
            best = Some((i, *x));
        }
    }
    match best {
        Some((i, _)) => Ok(Value::int_scalar(i as i64 + 1)),
        None => Ok(Value::int_vec(Vec::new())),
    }
}

fn which_min(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    which_extreme(ctx, args, "which.min(x)", false, line)
}

fn which_max(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    which_extreme(ctx, args, "which.max(x)", true, line)
}

/// 1-based positions of the NA elements.
fn which_na(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "which.na(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    fn na_positions<T>(data: &[Option<T>]) -> Vec<Option<i64>> {
        data.iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| Some(i as i64 + 1))
            .collect()
    }
    let out = match &v {
        Value::Logical(d) => na_positions(&d.data),
        Value::Int(d) => na_positions(&d.data),
        Value::Double(d) => na_positions(&d.data),
        Value::Char(d) => na_positions(&d.data),
        _ => Vec::new(),
    };
    Ok(Value::int_vec(out))
}

/// `tabulate(bin, nbins)`: counts of the positive integer bins.
fn tabulate(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("tabulate(bin) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let iv = as_int_vec(ctx, &v, line)?;
    let mut nbins = iv.iter().flatten().copied().max().unwrap_or(0).max(0) as usize;
    if args.len() >= 2 {
        let nv = force(ctx, args[1].value.clone())?;
        if let Some(n) = as_double_scalar(ctx, &nv, line)? {
            nbins = n.max(0.0) as usize;
        }
    }
    let mut out: Vec<i64> = vec![0; nbins];
    for e in iv.iter().flatten() {
        if *e >= 1 && (*e as usize) <= nbins {
            out[*e as usize - 1] += 1;
        }
    }
    Ok(Value::int_vec(out.into_iter().map(Some).collect()))
}

/// Whether both set operands are numeric, which keeps the result numeric.
fn numeric_set(x: &Value) -> bool {
    matches!(x, Value::Double(_) | Value::Int(_))
}

fn double_set(ctx: &Context, v: &Value, line: usize) -> Vec<OrderedFloat<f64>> {
    as_double_vec(ctx, v, line).unwrap_or_default()
                               .into_iter()
                               .flatten()
                               .map(OrderedFloat)
                               .collect()
}

fn set_union(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "union(x, y)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let y = force(ctx, args[1].value.clone())?;
    if numeric_set(&x) {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for e in double_set(ctx, &x, line).into_iter()
                                          .chain(double_set(ctx, &y, line))
        {
            if seen.insert(e) {
                out.push(Some(e.into_inner()));
            }
        }
        return Ok(Value::double_vec(out));
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in render_elements(&x).into_iter().chain(render_elements(&y)) {
        if seen.insert(s.clone()) {
            out.push(Some(s));
        }
    }
    Ok(Value::char_vec(out))
}

fn set_intersect(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "intersect(x, y)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let y = force(ctx, args[1].value.clone())?;
    if numeric_set(&x) {
        let ys: HashSet<_> = double_set(ctx, &y, line).into_iter().collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for e in double_set(ctx, &x, line) {
            if ys.contains(&e) && seen.insert(e) {
                out.push(Some(e.into_inner()));
            }
        }
        return Ok(Value::double_vec(out));
    }
    let ys: HashSet<String> = render_elements(&y).into_iter().collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in render_elements(&x) {
        if ys.contains(&s) && seen.insert(s.clone()) {
            out.push(Some(s));
        }
    }
    Ok(Value::char_vec(out))
}

fn set_diff(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "setdiff(x, y)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let y = force(ctx, args[1].value.clone())?;
    if numeric_set(&x) {
        let ys: HashSet<_> = double_set(ctx, &y, line).into_iter().collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for e in double_set(ctx, &x, line) {
            if !ys.contains(&e) && seen.insert(e) {
                out.push(Some(e.into_inner()));
            }
        }
        return Ok(Value::double_vec(out));
    }
    let ys: HashSet<String> = render_elements(&y).into_iter().collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in render_elements(&x) {
        if !ys.contains(&s) && seen.insert(s.clone()) {
            out.push(Some(s));
        }
    }
    Ok(Value::char_vec(out))
}

/// Shared by `LETTERS` and `letters`.
pub(crate) fn alphabet(upper: bool) -> Value {
    let base = if upper { b'A' } else { b'a' };
    let data = (0u8..26).map(|i| Some(((base + i) as char).to_string()))
                        .collect();
    Value::char_vec(data)
}
