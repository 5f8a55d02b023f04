use vectra::{debug_tokens, Token};

fn kinds(src: &str) -> Vec<Token> {
    debug_tokens(src).unwrap_or_else(|e| panic!("lexing failed for {src:?}: {e}"))
                     .into_iter()
                     .map(|t| t.token)
                     .collect()
}

#[test]
fn basic_token_streams() {
    let tests: Vec<(&str, Vec<Token>)> =
        vec![("1 + 2",
              vec![Token::Number(1.0), Token::Plus, Token::Number(2.0), Token::Eof]),
             ("x <- 10",
              vec![Token::Ident("x".to_string()),
                   Token::LeftAssign,
                   Token::Number(10.0),
                   Token::Eof]),
             ("function(a, b) { a + b }",
              vec![Token::Function,
                   Token::LParen,
                   Token::Ident("a".to_string()),
                   Token::Comma,
                   Token::Ident("b".to_string()),
                   Token::RParen,
                   Token::LBrace,
                   Token::Ident("a".to_string()),
                   Token::Plus,
                   Token::Ident("b".to_string()),
                   Token::RBrace,
                   Token::Eof])];

    for (src, expected) in tests {
        assert_eq!(kinds(src), expected, "source: {src}");
    }
}

#[test]
fn number_literals_keep_their_text() {
    let tests = ["42", "3.14", ".5", "1e10"];
    for src in tests {
        let toks = debug_tokens(src).unwrap();
        assert!(matches!(toks[0].token, Token::Number(_)), "source: {src}");
        assert_eq!(toks[0].text, src);
    }
}

#[test]
fn string_literals_resolve_escapes() {
    let tests = [(r#""hello""#, "hello"),
                 (r"'world'", "world"),
                 (r#""a\tb""#, "a\tb"),
                 (r#""say \"hi\"""#, "say \"hi\"")];
    for (src, expected) in tests {
        let toks = debug_tokens(src).unwrap();
        assert_eq!(toks[0].token, Token::Str(expected.to_string()), "source: {src}");
    }
}

#[test]
fn operators_lex_longest_match() {
    let tests = [("<-", Token::LeftAssign),
                 ("<<-", Token::SuperAssign),
                 ("=", Token::Assign),
                 ("==", Token::Eq),
                 ("!=", Token::Ne),
                 ("<", Token::Lt),
                 ("<=", Token::Le),
                 (">", Token::Gt),
                 (">=", Token::Ge),
                 ("%%", Token::Mod),
                 ("%/%", Token::IntDiv),
                 ("%in%", Token::InOp),
                 ("|>", Token::Pipe),
                 ("||", Token::OrOr),
                 ("&&", Token::AndAnd),
                 ("->", Token::RightAssign)];
    for (src, expected) in tests {
        let toks = debug_tokens(src).unwrap();
        assert_eq!(toks[0].token, expected, "source: {src}");
    }
}

#[test]
fn keywords_and_reserved_literals() {
    let tests = [("if", Token::If),
                 ("else", Token::Else),
                 ("for", Token::For),
                 ("repeat", Token::Repeat),
                 ("function", Token::Function),
                 ("TRUE", Token::True),
                 ("FALSE", Token::False),
                 ("NULL", Token::Null),
                 ("NA", Token::Na)];
    for (src, expected) in tests {
        let toks = debug_tokens(src).unwrap();
        assert_eq!(toks[0].token, expected, "source: {src}");
    }
}

#[test]
fn dotted_names_and_dots_are_identifiers() {
    assert_eq!(kinds("is.na")[0], Token::Ident("is.na".to_string()));
    assert_eq!(kinds("...")[0], Token::Ident("...".to_string()));
    assert_eq!(kinds("`odd name`")[0], Token::Ident("odd name".to_string()));
}

#[test]
fn newlines_are_contextual_separators() {
    // At depth zero the newline is a token; inside parentheses or
    // brackets it is whitespace.
    assert!(kinds("a\nb").contains(&Token::Newline));
    assert!(!kinds("f(a,\nb)").contains(&Token::Newline));
    assert!(!kinds("x[1,\n2]").contains(&Token::Newline));
    // Braces do not suppress newlines.
    assert!(kinds("{a\nb}").contains(&Token::Newline));
}

#[test]
fn comments_are_skipped() {
    assert_eq!(kinds("1 # one\n+ 2"),
               vec![Token::Number(1.0),
                    Token::Newline,
                    Token::Plus,
                    Token::Number(2.0),
                    Token::Eof]);
}

#[test]
fn lexical_errors_are_reported() {
    let tests = [("\"abc", "Unterminated string"),
                 ("\"abc\\", "Unterminated escape"),
                 ("`abc", "Unterminated backtick"),
                 ("5 % 3", "Illegal token '%'")];
    for (src, expected) in tests {
        let err = debug_tokens(src).unwrap_err().to_string();
        assert!(err.contains(expected), "source: {src}, error: {err}");
    }
}

#[test]
fn token_stream_round_trips() {
    // Joining the token literals with whitespace must re-lex to the same
    // token sequence.
    let sources = ["x <- c(1, 2) * 3",
                   "f <- function(a, b = 2) a %in% b",
                   "if (x >= 1) { y$z[2] } else w[[1]]",
                   "s <- \"a b\"; t <- 'c'"];
    for src in sources {
        let first = debug_tokens(src).unwrap();
        let rejoined: Vec<String> = first.iter().map(|t| t.text.clone()).collect();
        let second = debug_tokens(&rejoined.join(" ")).unwrap();
        let a: Vec<Token> = first.into_iter().map(|t| t.token).collect();
        let b: Vec<Token> = second.into_iter().map(|t| t.token).collect();
        assert_eq!(a, b, "source: {src}");
    }
}

#[test]
fn positions_track_lines_and_columns() {
    let toks = debug_tokens("x <- 1\ny <- 2").unwrap();
    assert_eq!((toks[0].pos.line, toks[0].pos.col), (1, 1));
    // `y` starts the second line.
    let y = toks.iter()
                .find(|t| t.token == Token::Ident("y".to_string()))
                .unwrap();
    assert_eq!((y.pos.line, y.pos.col), (2, 1));
    assert_eq!(y.pos.offset, 7);
}
