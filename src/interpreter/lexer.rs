use logos::Logos;

use crate::error::ParseError;

/// Represents a lexical token in the source input.
///
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens of the language. Newlines are
/// tokens of their own because they act as statement separators; whether a
/// particular newline is kept or discarded depends on nesting depth and is
/// decided by [`tokenize`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// Numeric literal tokens such as `42`, `3.14`, `.5` or `2.1e-10`.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", parse_number, priority = 10)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number, priority = 10)]
    Number(f64),
    /// String literal tokens quoted with `"` or `'`, escapes resolved.
    #[regex(r#""([^"\\]|\\[\s\S])*""#, unescape_string)]
    #[regex(r#"'([^'\\]|\\[\s\S])*'"#, unescape_string)]
    Str(String),
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `while`
    #[token("while")]
    While,
    /// `repeat`
    #[token("repeat")]
    Repeat,
    /// `break`
    #[token("break")]
    Break,
    /// `next`
    #[token("next")]
    Next,
    /// `function`
    #[token("function")]
    Function,
    /// `return`
    #[token("return")]
    Return,
    /// `TRUE`
    #[token("TRUE")]
    True,
    /// `FALSE`
    #[token("FALSE")]
    False,
    /// `NULL`
    #[token("NULL")]
    Null,
    /// `NA`
    #[token("NA")]
    Na,
    /// Identifier tokens, including dotted names like `is.na` and the
    /// reserved identifier `...`. Backtick quoting admits arbitrary text.
    #[regex(r"[A-Za-z_.][A-Za-z0-9_.]*", |lex| lex.slice().to_string())]
    #[regex(r"`[^`]*`", strip_backticks)]
    Ident(String),
    /// `<<-`
    #[token("<<-")]
    SuperAssign,
    /// `<-`
    #[token("<-")]
    LeftAssign,
    /// `->`
    #[token("->")]
    RightAssign,
    /// `=`
    #[token("=")]
    Assign,
    /// `==`
    #[token("==")]
    Eq,
    /// `!=`
    #[token("!=")]
    Ne,
    /// `<=`
    #[token("<=")]
    Le,
    /// `<`
    #[token("<")]
    Lt,
    /// `>=`
    #[token(">=")]
    Ge,
    /// `>`
    #[token(">")]
    Gt,
    /// `!`
    #[token("!")]
    Bang,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `&`
    #[token("&")]
    And,
    /// `||`
    #[token("||")]
    OrOr,
    /// `|>`
    #[token("|>")]
    Pipe,
    /// `|`
    #[token("|")]
    Or,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `%%`
    #[token("%%")]
    Mod,
    /// `%/%`
    #[token("%/%")]
    IntDiv,
    /// `%in%`
    #[token("%in%")]
    InOp,
    /// `:`
    #[token(":")]
    Colon,
    /// `$`
    #[token("$")]
    Dollar,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semi,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[[`
    #[token("[[")]
    LDBracket,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]]`
    #[token("]]")]
    RDBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// Newline statement separator (kept only at nesting depth zero).
    #[token("\n")]
    Newline,
    /// End of input. Synthesized by [`tokenize`]; the NUL pattern only
    /// exists to give the variant a spelling.
    #[token("\0")]
    Eof,
}

/// A source position: line and column are 1-based, the offset is a byte
/// index into the source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Pos {
    /// 1-based source line.
    pub line:   usize,
    /// 1-based column within the line.
    pub col:    usize,
    /// Byte offset into the source.
    pub offset: usize,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A token together with its literal source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token kind (with any decoded payload).
    pub token: Token,
    /// The literal text the token was lexed from.
    pub text:  String,
    /// The position of the first character of the token.
    pub pos:   Pos,
}

/// Turns source text into the token stream the parser consumes.
///
/// Statement-separating newlines are contextual: a newline is emitted only
/// when the nesting depth of parentheses and brackets is zero, otherwise it
/// is discarded as whitespace. Braces do not suppress newlines because they
/// delimit statement sequences. The returned stream always ends with an
/// [`Token::Eof`] entry.
///
/// # Errors
/// Returns a [`ParseError`] describing the first illegal token: an
/// unterminated string or escape, an unterminated backtick identifier, a
/// stray `%`, or any other unrecognized character.
///
/// # Example
/// ```
/// use vectra::interpreter::lexer::{tokenize, Token};
///
/// let toks = tokenize("x <- 1\n").unwrap();
/// assert_eq!(toks[0].token, Token::Ident("x".to_string()));
/// assert_eq!(toks[1].token, Token::LeftAssign);
/// assert_eq!(toks[4].token, Token::Eof);
/// ```
pub fn tokenize(src: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let line_starts = line_starts(src);
    let mut lexer = Token::lexer(src);
    let mut tokens = Vec::new();
    let mut depth = 0usize;

    while let Some(item) = lexer.next() {
        let span = lexer.span();
        let pos = pos_at(&line_starts, span.start);
        match item {
            Ok(token) => {
                match &token {
                    Token::LParen | Token::LBracket | Token::LDBracket => depth += 1,
                    Token::RParen | Token::RBracket | Token::RDBracket => {
                        depth = depth.saturating_sub(1);
                    },
                    _ => {},
                }
                if token == Token::Newline && depth > 0 {
                    continue;
                }
                tokens.push(SpannedToken { token,
                                           text: src[span].to_string(),
                                           pos });
            },
            Err(()) => return Err(classify_illegal(src, span.start, pos)),
        }
    }

    tokens.push(SpannedToken { token: Token::Eof,
                               text:  String::new(),
                               pos:   pos_at(&line_starts, src.len()), });
    Ok(tokens)
}

/// Reads all tokens from the source, for diagnostic tooling.
///
/// This is the same stream the parser sees, including the trailing EOF
/// entry and the contextual treatment of newlines.
///
/// # Errors
/// Returns the first lexical error, as [`tokenize`] does.
pub fn debug_tokens(src: &str) -> Result<Vec<SpannedToken>, ParseError> {
    tokenize(src)
}

fn line_starts(src: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn pos_at(line_starts: &[usize], offset: usize) -> Pos {
    let line = line_starts.partition_point(|&s| s <= offset);
    let start = line_starts[line - 1];
    Pos { line,
          col: offset - start + 1,
          offset }
}

/// Decides which lexical error an unmatched character sequence represents.
fn classify_illegal(src: &str, offset: usize, pos: Pos) -> ParseError {
    let rest = &src[offset..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            // The string regex failed, so the literal is unterminated; find
            // out whether it died inside an escape.
            let mut escaped = false;
            for c in chars {
                if escaped {
                    escaped = false;
                    continue;
                }
                match c {
                    '\\' => escaped = true,
                    c if c == quote => break,
                    _ => {},
                }
            }
            if escaped {
                ParseError::UnterminatedEscape { line: pos.line }
            } else {
                ParseError::UnterminatedString { line: pos.line }
            }
        },
        Some('`') => ParseError::UnterminatedBacktick { line: pos.line },
        Some(c) => ParseError::IllegalToken { token: c.to_string(),
                                              line:  pos.line, },
        None => ParseError::UnexpectedEndOfInput { line: pos.line },
    }
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Resolves the escape sequences of a quoted string literal.
///
/// Supported escapes are `\n`, `\t`, `\r`, `\\`, `\"` and `\'`; an unknown
/// escape passes the escaped character through verbatim.
fn unescape_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}

/// Strips the quoting backticks off a backtick identifier.
fn strip_backticks(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}
