use std::fs;

use clap::Parser;
use rustyline::{error::ReadlineError, DefaultEditor};
use vectra::Context;

/// vectra is a minimal interpreter for a vectorized, R-compatible array
/// language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Evaluate the given expression and print the result.
    #[arg(short = 'e', long = "expr")]
    expr: Option<String>,

    /// Script file to run. Without a file or -e, an interactive session
    /// starts.
    path: Option<String>,
}

fn main() {
    let args = Args::parse();
    let ctx = Context::new();

    if let Some(expr) = args.expr {
        run_and_print(&ctx, &expr);
        return;
    }

    if let Some(path) = args.path {
        let src = fs::read_to_string(&path).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{path}'. Perhaps this file does not exist?");
            std::process::exit(1);
        });
        run_and_print(&ctx, &src);
        return;
    }

    repl(&ctx);
}

/// Evaluates a program and prints its captured output, or the rendered
/// last value if nothing was printed. Errors go to standard error with
/// exit code 1.
fn run_and_print(ctx: &Context, src: &str) {
    match ctx.eval_source(src) {
        Ok(out) => {
            if out.output.trim().is_empty() {
                println!("{}", out.value);
            } else {
                print!("{}", out.output);
            }
        },
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        },
    }
}

/// The interactive read-eval loop. Input is fed to the evaluator only
/// once parentheses, braces and brackets balance, so multi-line
/// expressions keep accumulating; `quit` exits.
fn repl(ctx: &Context) {
    println!("vectra (minimal R-compatible interpreter) — type 'quit' to exit");
    let mut editor = match DefaultEditor::new() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        },
    };

    let mut buf = String::new();
    loop {
        let prompt = if buf.is_empty() { "> " } else { "+ " };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            },
        };
        if line.trim() == "quit" {
            break;
        }

        buf.push_str(&line);
        buf.push('\n');
        if !looks_complete(&buf) {
            continue;
        }
        let _ = editor.add_history_entry(buf.trim_end());

        match ctx.eval_source(&buf) {
            Ok(out) => {
                if !out.output.trim().is_empty() {
                    print!("{}", out.output);
                }
                println!("{}", out.value);
            },
            Err(e) => println!("Error: {e}"),
        }
        buf.clear();
    }
}

/// Whether parentheses, braces and brackets balance, ignoring bracket
/// characters inside string literals.
fn looks_complete(src: &str) -> bool {
    let mut parens = 0i32;
    let mut braces = 0i32;
    let mut brackets = 0i32;
    let mut in_str = false;
    let mut quote = '\0';
    let mut escaped = false;

    for ch in src.chars() {
        if in_str {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                c if c == quote => in_str = false,
                _ => {},
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                in_str = true;
                quote = ch;
            },
            '(' => parens += 1,
            ')' => parens = (parens - 1).max(0),
            '{' => braces += 1,
            '}' => braces = (braces - 1).max(0),
            '[' => brackets += 1,
            ']' => brackets = (brackets - 1).max(0),
            _ => {},
        }
    }
    parens == 0 && braces == 0 && brackets == 0
}
