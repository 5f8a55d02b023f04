use vectra::{eval_source, to_json, Context};

fn value_of(src: &str) -> String {
    let out = eval_source(src).unwrap_or_else(|e| panic!("script failed: {e}\nsource: {src}"));
    out.value.to_string()
}

fn output_of(src: &str) -> String {
    let out = eval_source(src).unwrap_or_else(|e| panic!("script failed: {e}\nsource: {src}"));
    out.output
}

fn error_of(src: &str) -> String {
    match eval_source(src) {
        Ok(out) => panic!("script succeeded but was expected to fail: {src} => {}", out.value),
        Err(e) => e.to_string(),
    }
}

fn assert_values(tests: &[(&str, &str)]) {
    for (src, expected) in tests {
        assert_eq!(value_of(src), *expected, "source: {src}");
    }
}

// --- Arithmetic, comparison and logic ---

#[test]
fn basic_arithmetic() {
    assert_values(&[("1 + 2", "3"),
                    ("10 - 3", "7"),
                    ("4 * 5", "20"),
                    ("20 / 4", "5"),
                    ("2 ^ 3", "8"),
                    ("7 %% 3", "1"),
                    ("7 %/% 2", "3")]);
}

#[test]
fn operator_precedence_and_associativity() {
    assert_values(&[("2 + 3 * 4", "14"),
                    ("2 ^ 3 ^ 2", "512"),
                    ("-2 ^ 2", "4"),
                    ("10 - 2 - 3", "5"),
                    ("a <- b <- 5\na + b", "10")]);
}

#[test]
fn vectorized_arithmetic_recycles() {
    assert_values(&[("c(1, 2, 3) + 10", "11 12 13"),
                    ("c(1, 2, 3, 4, 5, 6) + c(10, 20)", "11 22 13 24 15 26"),
                    ("c(1, 2, 3) * c(2, 3)", "2 6 6")]);
}

#[test]
fn na_poisons_arithmetic_and_comparison() {
    assert_values(&[("1 + NA", "NA"),
                    ("c(1, NA, 3) * 2", "2 NA 6"),
                    ("NA > 1", "NA"),
                    ("c(1, NA) == 1", "TRUE NA")]);
}

#[test]
fn length_zero_recycling_gives_length_zero() {
    assert_values(&[("length(c() + 1)", "0"), ("length(NULL)", "0")]);
}

#[test]
fn comparison_operators() {
    assert_values(&[("1 < 2", "TRUE"),
                    ("2 > 1", "TRUE"),
                    ("1 == 1", "TRUE"),
                    ("1 != 2", "TRUE"),
                    ("1 == 2", "FALSE"),
                    ("\"apple\" < \"banana\"", "TRUE"),
                    ("c(\"a\", \"b\") == \"a\"", "TRUE FALSE"),
                    ("TRUE > FALSE", "TRUE")]);
}

#[test]
fn three_valued_logic() {
    assert_values(&[("c(TRUE, NA, FALSE) | c(FALSE, FALSE, NA)", "TRUE NA NA"),
                    ("c(TRUE, NA, FALSE) & c(TRUE, TRUE, NA)", "TRUE NA FALSE"),
                    ("NA & FALSE", "FALSE"),
                    ("NA | TRUE", "TRUE"),
                    ("NA & TRUE", "NA"),
                    ("NA | FALSE", "NA")]);
}

#[test]
fn short_circuit_operators() {
    assert_values(&[("TRUE && FALSE", "FALSE"),
                    ("FALSE && stop(\"never\")", "FALSE"),
                    ("TRUE || stop(\"never\")", "TRUE"),
                    ("NA && FALSE", "FALSE"),
                    ("NA && TRUE", "NA"),
                    ("NA || TRUE", "TRUE"),
                    ("NA || FALSE", "NA")]);
}

#[test]
fn sequence_operator() {
    assert_values(&[("1:5", "1 2 3 4 5"),
                    ("5:1", "5 4 3 2 1"),
                    ("1.7:4", "1 2 3 4"),
                    ("1:NA", "NA"),
                    ("length(1:10)", "10")]);
}

#[test]
fn unary_operators() {
    assert_values(&[("-5", "-5"),
                    ("-c(1, 2)", "-1 -2"),
                    ("+3", "3"),
                    ("!TRUE", "FALSE"),
                    ("!c(TRUE, FALSE, NA)", "FALSE TRUE NA")]);
}

// --- Assignment and environments ---

#[test]
fn assignment_forms() {
    assert_values(&[("x <- 10\nx", "10"),
                    ("y = 20\ny", "20"),
                    ("10 -> z\nz", "10"),
                    ("x <<- 5\nx", "5")]);
}

#[test]
fn copy_on_write_subset_assignment() {
    let src = "x <- c(1, 2, 3)\ny <- x\ny[1] <- 99\nx";
    assert_eq!(value_of(src), "1 2 3");
    let src = "x <- c(1, 2, 3)\ny <- x\ny[1] <- 99\ny";
    assert_eq!(value_of(src), "99 2 3");
}

#[test]
fn subset_assignment_extends_with_na() {
    assert_values(&[("x <- c(1, 2)\nx[5] <- 9\nx", "1 2 NA NA 9"),
                    ("x <- 1:3\nx[2] <- 0\nx", "1 0 3")]);
}

#[test]
fn super_assignment_walks_enclosing_frames() {
    let src = "h <- function() { x <- 0; inc <- function() x <<- x + 1; inc(); inc(); x }\nh()";
    assert_eq!(value_of(src), "2");
}

#[test]
fn t_and_f_are_ordinary_bindings() {
    assert_values(&[("T", "TRUE"), ("F", "FALSE"), ("T <- FALSE\nT", "FALSE")]);
}

#[test]
fn invalid_assignment_targets_are_parse_errors() {
    assert!(error_of("1 <- 2").contains("Invalid assignment target"));
    assert!(error_of("f(x) <- 2").contains("Invalid assignment target"));
    assert!(error_of("5 -> 6").contains("Invalid assignment target"));
}

// --- Control flow ---

#[test]
fn if_else() {
    assert_values(&[("if (TRUE) 1 else 2", "1"),
                    ("if (FALSE) 1 else 2", "2"),
                    ("if (FALSE) 1", "NULL"),
                    ("x <- 3\nif (x > 0) \"pos\" else \"neg\"", "\"pos\""),
                    ("if (TRUE) 1\nelse 2", "1")]);
}

#[test]
fn na_condition_is_an_error() {
    assert!(error_of("if (NA) 1").contains("missing value where TRUE/FALSE needed"));
    assert!(error_of("while (NA) 1").contains("missing value where TRUE/FALSE needed"));
}

#[test]
fn non_scalar_condition_is_an_error() {
    assert!(error_of("if (c(TRUE, TRUE)) 1").contains("expected scalar logical, got length 2"));
}

#[test]
fn loops() {
    assert_values(&[("s <- 0\nfor (i in 1:5) s <- s + i\ns", "15"),
                    ("i <- 0\nwhile (i < 3) i <- i + 1\ni", "3"),
                    ("i <- 0\nrepeat { i <- i + 1; if (i >= 3) break }\ni", "3")]);
}

#[test]
fn break_and_next() {
    assert_values(&[("s <- 0\nfor (i in 1:10) { if (i > 3) break; s <- s + i }\ns", "6"),
                    ("s <- 0\nfor (i in 1:5) { if (i == 2) next; s <- s + i }\ns", "13")]);
}

#[test]
fn loop_over_list_binds_whole_elements() {
    let src = "n <- 0\nfor (e in list(c(1, 2), c(3, 4, 5))) n <- n + length(e)\nn";
    assert_eq!(value_of(src), "5");
}

#[test]
fn control_misuse_is_an_error() {
    assert!(error_of("break").contains("break used outside of a loop"));
    assert!(error_of("next").contains("next used outside of a loop"));
    assert!(error_of("f <- function() break\nfor (i in 1:3) f()")
        .contains("break used outside of a loop"));
}

#[test]
fn return_unwinds_to_the_call() {
    assert_values(&[("f <- function(x) { if (x > 0) return(\"pos\"); \"neg\" }\nf(5)",
                     "\"pos\""),
                    ("f <- function(x) { if (x > 0) return(\"pos\"); \"neg\" }\nf(-1)",
                     "\"neg\""),
                    ("f <- function() return()\nf()", "NULL")]);
}

// --- Functions, promises, dots ---

#[test]
fn closures_capture_their_environment() {
    assert_values(&[("f <- function(x) { x * 2 }\nf(5)", "10"),
                    ("make <- function(n) function(x) x + n\nadd2 <- make(2)\nadd2(40)",
                     "42")]);
}

#[test]
fn defaults_see_earlier_parameters() {
    assert_eq!(value_of("f <- function(x = 2, y = x + 1) y\nf()"), "3");
    assert_eq!(value_of("f <- function(x = 2, y = x + 1) y\nf(10)"), "11");
}

#[test]
fn named_arguments_match_before_positional() {
    assert_values(&[("f <- function(a, b) a - b\nf(b = 1, 10)", "9"),
                    ("f <- function(a, b, c) c\nf(c = 3, 1, 2)", "3")]);
}

#[test]
fn duplicate_and_unused_arguments_are_errors() {
    assert!(error_of("f <- function(a) a\nf(a = 1, a = 2)").contains("matched by multiple"));
    assert!(error_of("f <- function(a) a\nf(1, 2)").contains("unused argument"));
    assert!(error_of("f <- function(a) a\nf(bogus = 1)").contains("unused argument 'bogus'"));
}

#[test]
fn dots_forwarding_preserves_arguments() {
    assert_values(&[("g <- function(...) sum(...)\ng(1, 2, 3, 4)", "10"),
                    ("g <- function(...) nargs(...)\ng(1, 2, 3)", "3"),
                    ("outer <- function(...) inner(...)\ninner <- function(a, b) a - b\nouter(9, 4)",
                     "5")]);
}

#[test]
fn promises_force_at_most_once() {
    let src = "f <- function(a) a + a\nf({ cat(\"x\"); 2 })";
    let out = eval_source(src).unwrap();
    assert_eq!(out.value.to_string(), "4");
    assert_eq!(out.output, "x");
}

#[test]
fn unused_lazy_arguments_never_evaluate() {
    let src = "f <- function(a, b) a\nf(1, stop(\"boom\"))";
    assert_eq!(value_of(src), "1");
}

#[test]
fn missing_detects_unset_parameters() {
    assert_values(&[("f <- function(x) missing(x)\nf()", "TRUE"),
                    ("f <- function(x) missing(x)\nf(1)", "FALSE"),
                    ("f <- function(x = 3) missing(x)\nf()", "FALSE")]);
}

#[test]
fn quote_captures_the_expression() {
    assert_values(&[("typeof(quote(x + 1))", "\"expr\""),
                    ("quote(f(x))", "expression(f(...))")]);
}

#[test]
fn calling_a_non_function_is_an_error() {
    assert!(error_of("x <- 5\nx(1)").contains("attempt to apply non-function"));
}

#[test]
fn unknown_names_are_errors() {
    assert!(error_of("no.such.object").contains("object 'no.such.object' not found"));
}

// --- Subsetting ---

#[test]
fn single_bracket_reads() {
    assert_values(&[("x <- c(10, 20, 30)\nx[2]", "20"),
                    ("x <- 1:5\nx[c(2, 4)]", "2 4"),
                    ("x <- 1:5\nx[-c(1, 2)]", "3 4 5"),
                    ("x <- 1:5\nx[c(TRUE, FALSE)]", "1 3 5"),
                    ("x <- 1:3\nx[0]", "c()"),
                    ("x <- 1:3\nx[10]", "NA"),
                    ("x <- 1:3\nx[c(1, NA)]", "1 NA")]);
}

#[test]
fn mixed_subscript_signs_are_an_error() {
    assert!(error_of("c(1, 2, 3)[c(-1, 2)]")
        .contains("only 0's may be mixed with negative subscripts"));
}

#[test]
fn double_bracket_reads() {
    assert_values(&[("c(10, 20, 30)[[2]]", "20"),
                    ("list(1, \"two\")[[2]]", "\"two\""),
                    ("lst <- list(a = 1, b = 2)\nlst[[\"b\"]]", "2")]);
    assert!(error_of("c(1, 2)[[5]]").contains("subscript out of bounds"));
    assert!(error_of("c(1, 2)[[c(1, 2)]]").contains("[[ expects a single index"));
}

#[test]
fn dollar_reads() {
    assert_values(&[("lst <- list(a = 1, b = \"two\")\nlst$b", "\"two\""),
                    ("lst <- list(a = 1)\nlst$zz", "NULL")]);
    assert!(error_of("c(1, 2)$a").contains("$ operator is invalid for atomic vectors"));
}

#[test]
fn named_subset_through_names_attribute() {
    assert_values(&[("t <- table(c(\"a\", \"b\", \"a\"))\nt[\"a\"]", "2"),
                    ("t <- table(c(\"a\", \"b\", \"a\"))\nt[\"zz\"]", "NA")]);
}

#[test]
fn list_and_dollar_writes() {
    assert_values(&[("lst <- list(a = 1)\nlst$b <- 2\nlst$b", "2"),
                    ("lst <- list(a = 1)\nlst$a <- 9\nlst$a", "9"),
                    ("lst <- list(a = 1)\nlst$b <- 2\nnames(lst)", "\"a\" \"b\""),
                    ("l <- list(1)\nl[[3]] <- 5\nlength(l)", "3"),
                    ("l <- list(1)\nl[[3]] <- 5\nl[[2]]", "NULL")]);
}

#[test]
fn subset_inverse_property() {
    let src = "x <- c(5, 1, 4, 2)\np <- c(3, 1, 4, 2)\nidentical(x[p][order(p)], x)";
    assert_eq!(value_of(src), "TRUE");
}

// --- Output builtins ---

#[test]
fn print_writes_rendered_values() {
    assert_eq!(output_of("print(\"hello\")"), "\"hello\"\n");
    assert_eq!(output_of("print(1:3)"), "1 2 3\n");
    assert_eq!(output_of("print(list())"), "list()\n");
}

#[test]
fn cat_joins_with_sep_and_end() {
    assert_eq!(output_of("cat(\"a\", \"b\")"), "a b");
    assert_eq!(output_of("cat(\"a\", \"b\", sep = \"-\")"), "a-b");
    assert_eq!(output_of("cat(\"x\", end = \"!\")"), "x!");
    assert_eq!(output_of("cat(c(1, 2), 3)"), "1 2 3");
}

#[test]
fn warning_and_message_print_lines() {
    assert_eq!(output_of("warning(\"careful\")"), "Warning: careful\n");
    assert_eq!(output_of("message(\"test message\")"), "test message\n");
}

#[test]
fn str_dumps_structure() {
    assert!(output_of("str(c(1.5, 2))").contains("Type=double Len=2"));
}

#[test]
fn output_accumulates_before_an_error() {
    let err = eval_source("cat(\"partial\")\nstop(\"halt\")").unwrap_err();
    assert_eq!(err.output, "partial");
    assert!(err.error.to_string().contains("halt"));
}

// --- Construction and coercion ---

#[test]
fn c_widens_types() {
    assert_values(&[("c(1, 2, 3)", "1 2 3"),
                    ("c(TRUE, FALSE)", "TRUE FALSE"),
                    ("c(1, TRUE)", "1 1"),
                    ("c(1, \"a\")", "\"1\" \"a\""),
                    ("c()", "c()"),
                    ("typeof(c(1:2, 3:4))", "\"integer\""),
                    ("typeof(c(1, 2.5))", "\"double\"")]);
}

#[test]
fn c_with_a_list_argument_builds_a_list() {
    assert_values(&[("length(c(list(1, 2), 3))", "3"),
                    ("is.list(c(list(1), list(2)))", "TRUE")]);
}

#[test]
fn coercion_builtins() {
    assert_values(&[("as.integer(3.9)", "3"),
                    ("as.numeric(TRUE)", "1"),
                    ("as.character(c(1, 2))", "\"1\" \"2\""),
                    ("as.logical(0)", "FALSE"),
                    ("as.logical(c(1, 0, NA))", "TRUE FALSE NA")]);
    assert!(error_of("as.numeric(list(1))").contains("cannot coerce"));
}

#[test]
fn typeof_and_class() {
    assert_values(&[("typeof(1)", "\"integer\""),
                    ("typeof(1.5)", "\"double\""),
                    ("typeof(\"a\")", "\"character\""),
                    ("typeof(TRUE)", "\"logical\""),
                    ("typeof(list())", "\"list\""),
                    ("typeof(NULL)", "\"null\""),
                    ("typeof(print)", "\"function\""),
                    ("class(1.5)", "\"double\"")]);
}

#[test]
fn attributes_and_names() {
    assert_values(&[("names(list(a = 1, b = 2))", "\"a\" \"b\""),
                    ("attributes(1:3)", "NULL"),
                    ("attr(1:3, \"zap\")", "NULL"),
                    ("lst <- list(a = 1)\nattr(lst, \"names\")", "\"a\"")]);
}

#[test]
fn is_predicates() {
    assert_values(&[("is.numeric(1)", "TRUE"),
                    ("is.numeric(1:5)", "TRUE"),
                    ("is.numeric(\"a\")", "FALSE"),
                    ("is.character(\"hello\")", "TRUE"),
                    ("is.logical(TRUE)", "TRUE"),
                    ("is.null(NULL)", "TRUE"),
                    ("is.null(1)", "FALSE"),
                    ("is.list(list(1, 2))", "TRUE"),
                    ("is.list(c(1, 2))", "FALSE"),
                    ("is.function(print)", "TRUE"),
                    ("is.vector(c(1, 2, 3))", "TRUE"),
                    ("is.finite(1)", "TRUE"),
                    ("is.finite(Inf)", "FALSE"),
                    ("is.nan(NaN)", "TRUE"),
                    ("is.nan(1)", "FALSE"),
                    ("is.infinite(Inf)", "TRUE"),
                    ("is.na(NA)", "TRUE"),
                    ("is.na(c(1, NA, 3))", "FALSE TRUE FALSE")]);
}

#[test]
fn identical_compares_type_and_rendering() {
    assert_values(&[("identical(1, 1)", "TRUE"),
                    ("identical(1, 2)", "FALSE"),
                    ("identical(\"a\", \"a\")", "TRUE"),
                    ("identical(1, \"1\")", "FALSE")]);
}

#[test]
fn exists_checks_the_global_frame() {
    assert_values(&[("x <- 5\nexists(\"x\")", "TRUE"), ("exists(\"zzz\")", "FALSE")]);
}

// --- Math builtins ---

#[test]
fn math_functions() {
    assert_values(&[("abs(-5)", "5"),
                    ("abs(c(-1, -2, 3))", "1 2 3"),
                    ("sqrt(c(1, 4, 9))", "1 2 3"),
                    ("floor(3.7)", "3"),
                    ("ceiling(3.2)", "4"),
                    ("round(3.456, 2)", "3.46"),
                    ("round(3.5)", "4"),
                    ("trunc(3.9)", "3"),
                    ("trunc(-3.9)", "-3"),
                    ("exp(0)", "1"),
                    ("log(1)", "0"),
                    ("log2(8)", "3"),
                    ("log10(100)", "2"),
                    ("sign(-5)", "-1"),
                    ("sign(0)", "0"),
                    ("sign(3)", "1"),
                    ("round(sin(pi / 2), 1)", "1"),
                    ("round(atan2(1, 1), 6)", "0.785398")]);
}

#[test]
fn reductions() {
    assert_values(&[("sum(1, 2, 3)", "6"),
                    ("sum(c(10, 20, 30))", "60"),
                    ("sum()", "0"),
                    ("sum(c(1, NA, 3))", "NA"),
                    ("sum(c(1, NA, 3), na.rm = TRUE)", "4"),
                    ("prod(c(2, 3, 4))", "24"),
                    ("prod()", "1"),
                    ("mean(c(1, 2, 3))", "2"),
                    ("mean(c(1, NA), na.rm = TRUE)", "1"),
                    ("round(sd(c(1, 2, 3, 4)), 4)", "1.291"),
                    ("max(1, 5, 3)", "5"),
                    ("min(c(10, 20, 30))", "10"),
                    ("range(c(3, 1, 5, 2))", "1 5"),
                    ("any(c(FALSE, TRUE, FALSE))", "TRUE"),
                    ("any(c(FALSE, FALSE))", "FALSE"),
                    ("any(c(FALSE, NA))", "NA"),
                    ("all(c(TRUE, TRUE, TRUE))", "TRUE"),
                    ("all(c(TRUE, FALSE, TRUE))", "FALSE"),
                    ("all(c(TRUE, NA), na.rm = TRUE)", "TRUE")]);
}

#[test]
fn cumulatives_poison_after_na() {
    assert_values(&[("cumsum(c(1, 2, 3, 4))", "1 3 6 10"),
                    ("cumprod(c(1, 2, 3, 4))", "1 2 6 24"),
                    ("cummax(c(1, 3, 2, 5))", "1 3 3 5"),
                    ("cummin(c(5, 3, 4, 1))", "5 3 3 1"),
                    ("cumsum(c(1, NA, 3))", "1 NA NA")]);
}

#[test]
fn diff_with_lag() {
    assert_values(&[("diff(c(1, 3, 6, 10))", "2 3 4"),
                    ("diff(c(1, 3, 6, 10), 2)", "5 7"),
                    ("length(diff(c(1)))", "0")]);
}

#[test]
fn constants() {
    assert_values(&[("round(pi, 4)", "3.1416"),
                    ("is.infinite(Inf)", "TRUE"),
                    ("is.nan(NaN)", "TRUE"),
                    ("length(letters)", "26"),
                    ("LETTERS[1]", "\"A\""),
                    ("letters[26]", "\"z\"")]);
}

// --- Sequence and vector utilities ---

#[test]
fn seq_variants() {
    assert_values(&[("seq(5)", "1 2 3 4 5"),
                    ("seq(from = 2, to = 10, by = 2)", "2 4 6 8 10"),
                    ("seq(from = 5, to = 1, by = -2)", "5 3 1"),
                    ("seq_len(5)", "1 2 3 4 5"),
                    ("seq_along(c(10, 20, 30))", "1 2 3")]);
    assert!(error_of("seq(from = 1)").contains("missing 'to'"));
    assert!(error_of("seq(to = 5, by = 0)").contains("non-zero"));
}

#[test]
fn vector_utilities() {
    assert_values(&[("rep(c(1, 2), 3)", "1 2 1 2 1 2"),
                    ("rev(c(1, 2, 3))", "3 2 1"),
                    ("sort(c(3, 1, 2))", "1 2 3"),
                    ("sort(c(3, 1, 2), decreasing = TRUE)", "3 2 1"),
                    ("sort(c(\"b\", \"a\", \"c\"))", "\"a\" \"b\" \"c\""),
                    ("order(c(30, 10, 20))", "2 3 1"),
                    ("unique(c(1, 2, 2, 3, 1))", "1 2 3"),
                    ("duplicated(c(1, 2, 2, 3, 1))", "FALSE FALSE TRUE FALSE TRUE"),
                    ("match(c(\"b\", \"d\", \"a\"), c(\"a\", \"b\", \"c\"))", "2 NA 1"),
                    ("append(c(1, 2, 3), c(4, 5))", "1 2 3 4 5"),
                    ("which(c(FALSE, TRUE, FALSE, TRUE))", "2 4"),
                    ("which.min(c(3, 1, 2))", "2"),
                    ("which.max(c(3, 1, 2))", "1"),
                    ("which.na(c(1, NA, 3, NA))", "2 4"),
                    ("tabulate(c(2, 3, 3, 5))", "0 1 2 0 1")]);
}

#[test]
fn table_counts_sorted_keys() {
    assert_values(&[("table(c(\"a\", \"b\", \"a\", \"c\", \"b\", \"a\"))", "3 2 1"),
                    ("names(table(c(\"b\", \"a\")))", "\"a\" \"b\"")]);
}

#[test]
fn set_operations_preserve_numbers() {
    assert_values(&[("union(c(1, 2, 3), c(3, 4, 5))", "1 2 3 4 5"),
                    ("intersect(c(1, 2, 3), c(2, 3, 4))", "2 3"),
                    ("setdiff(c(1, 2, 3), c(2, 3, 4))", "1"),
                    ("union(c(\"a\", \"b\"), c(\"b\", \"c\"))", "\"a\" \"b\" \"c\"")]);
}

#[test]
fn membership_operator() {
    assert_values(&[("2 %in% c(1, 2, 3)", "TRUE"),
                    ("4 %in% c(1, 2, 3)", "FALSE"),
                    ("c(1, 4, 2) %in% c(1, 2, 3)", "TRUE FALSE TRUE"),
                    ("\"b\" %in% c(\"a\", \"b\")", "TRUE")]);
}

// --- Strings ---

#[test]
fn paste_family() {
    assert_values(&[("paste(\"hello\", \"world\")", "\"hello world\""),
                    ("paste0(\"hello\", \"world\")", "\"helloworld\""),
                    ("paste(\"a\", \"b\", sep = \"-\")", "\"a-b\""),
                    ("paste(c(\"x\", \"y\"), collapse = \",\")", "\"x,y\""),
                    ("paste(c(\"a\", \"b\"), 1:2)", "\"a 1\" \"b 2\"")]);
}

#[test]
fn string_builtins() {
    assert_values(&[("nchar(\"hello\")", "5"),
                    ("substr(\"hello world\", 1, 5)", "\"hello\""),
                    ("substring(\"hello\", 2, 4)", "\"ell\""),
                    ("toupper(\"hello\")", "\"HELLO\""),
                    ("tolower(\"WORLD\")", "\"world\""),
                    ("trimws(\"  hello  \")", "\"hello\""),
                    ("trimws(\"  x  \", which = \"left\")", "\"x  \""),
                    ("startsWith(\"hello\", \"hel\")", "TRUE"),
                    ("endsWith(\"hello\", \"llo\")", "TRUE"),
                    ("endsWith(\"hello\", \"world\")", "FALSE"),
                    ("chartr(\"abc\", \"xyz\", \"aabbcc\")", "\"xxyyzz\""),
                    ("strrep(\"ab\", 3)", "\"ababab\"")]);
}

#[test]
fn pattern_functions_use_substring_semantics() {
    assert_values(&[("grepl(\"lo\", c(\"hello\", \"world\", \"below\"))", "TRUE FALSE TRUE"),
                    ("grep(\"lo\", c(\"hello\", \"world\", \"below\"))", "1 3"),
                    ("grep(\"lo\", c(\"hello\", \"world\"), value = TRUE)", "\"hello\""),
                    ("sub(\"o\", \"0\", \"hello world\")", "\"hell0 world\""),
                    ("gsub(\"o\", \"0\", \"hello world\")", "\"hell0 w0rld\""),
                    // A regex metacharacter is just a character here.
                    ("grepl(\".\", \"ab\")", "FALSE"),
                    ("gsub(\".\", \"!\", \"a.b\")", "\"a!b\"")]);
}

#[test]
fn strsplit_returns_a_list() {
    assert_values(&[("length(strsplit(\"a,b,c\", \",\"))", "1"),
                    ("strsplit(\"a,b,c\", \",\")[[1]]", "\"a\" \"b\" \"c\"")]);
}

#[test]
fn sprintf_formats_verbs() {
    assert_values(&[("sprintf(\"Hello %s, you are %d\", \"world\", 42)",
                     "\"Hello world, you are 42\""),
                    ("sprintf(\"%.2f\", 3.14159)", "\"3.14\""),
                    ("sprintf(\"%5d\", 42)", "\"   42\""),
                    ("sprintf(\"%-5d|\", 42)", "\"42   |\""),
                    ("sprintf(\"100%%\")", "\"100%\"")]);
}

#[test]
fn format_renders_elements() {
    assert_values(&[("format(1.5)", "\"1.5\""), ("format(c(1, 2))", "\"1\" \"2\"")]);
}

// --- Functional builtins ---

#[test]
fn apply_family() {
    assert_values(&[("length(lapply(list(1, 4, 9), sqrt))", "3"),
                    ("sapply(c(1, 4, 9), sqrt)", "1 2 3"),
                    ("sapply(c(1, 2, 3), function(x) x * 2)", "2 4 6"),
                    ("vapply(c(1, 4, 9), sqrt, 0)", "1 2 3"),
                    ("Map(function(a, b) a + b, c(1, 2), c(10, 20))[[2]]", "22"),
                    ("Reduce(function(a, b) a + b, c(1, 2, 3, 4), 0)", "10"),
                    ("Reduce(function(a, b) a * b, c(2, 3, 4))", "24"),
                    ("length(Filter(function(x) x > 2, c(1, 2, 3, 4, 5)))", "3"),
                    ("do.call(paste, list(\"a\", \"b\", \"c\"))", "\"a b c\""),
                    ("do.call(paste, list(\"a\", \"b\", sep = \"+\"))", "\"a+b\"")]);
}

// --- Control builtins ---

#[test]
fn ifelse_is_vectorized() {
    assert_values(&[("ifelse(c(TRUE, FALSE, TRUE), c(1, 2, 3), c(10, 20, 30))", "1 20 3"),
                    ("ifelse(c(TRUE, FALSE), \"y\", \"n\")", "\"y\" \"n\""),
                    ("ifelse(c(TRUE, NA), 1, 2)", "1 NA")]);
}

#[test]
fn switch_selects_by_name() {
    assert_values(&[("switch(\"b\", a = 1, b = 2, c = 3)", "2"),
                    ("switch(\"z\", a = 1, 5)", "5"),
                    ("switch(\"z\", a = 1)", "NULL")]);
}

#[test]
fn try_catch_catches_errors() {
    assert_values(&[("tryCatch(stop(\"oops\"), error = function(e) paste(\"caught:\", e))",
                     "\"caught: oops\""),
                    ("tryCatch(1 + 1, error = function(e) \"unreached\")", "2"),
                    ("tryCatch(no.such.thing, error = function(e) e)",
                     "\"object 'no.such.thing' not found\"")]);
    assert!(error_of("tryCatch(stop(\"x\"))").contains("x"));
}

#[test]
fn stop_raises_user_errors() {
    assert!(error_of("stop(\"my message\")").contains("my message"));
    assert!(error_of("stop()").contains("stopped"));
}

// --- Data frames ---

#[test]
fn data_frame_basics() {
    let setup = "df <- data.frame(x = 1:3, y = c(4, 5, 6))\n";
    assert_eq!(value_of(&format!("{setup}nrow(df)")), "3");
    assert_eq!(value_of(&format!("{setup}ncol(df)")), "2");
    assert_eq!(value_of(&format!("{setup}dim(df)")), "3 2");
    assert_eq!(value_of(&format!("{setup}is.data.frame(df)")), "TRUE");
    assert_eq!(value_of(&format!("{setup}names(df)")), "\"x\" \"y\"");
    assert_eq!(value_of(&format!("{setup}df$y")), "4 5 6");
    assert_eq!(value_of(&format!("{setup}class(df)")), "\"data.frame\"");
}

#[test]
fn data_frame_recycles_and_drops_null() {
    assert_values(&[("df <- data.frame(x = 1:4, y = 0)\ndf$y", "0 0 0 0"),
                    ("df <- data.frame(x = 1:2, y = NULL)\nncol(df)", "1"),
                    ("df <- data.frame(1:2, 3:4)\nnames(df)", "\"V1\" \"V2\"")]);
}

#[test]
fn head_and_tail() {
    assert_values(&[("head(1:10, 3)", "1 2 3"),
                    ("tail(1:10, n = 3)", "8 9 10"),
                    ("head(1:3)", "1 2 3"),
                    ("df <- data.frame(x = 1:10)\nnrow(head(df, 2))", "2"),
                    ("df <- data.frame(x = 1:10)\ndf2 <- tail(df, 2)\ndf2$x", "9 10")]);
}

// --- Pipe ---

#[test]
fn pipe_rewrites_into_calls() {
    assert_values(&[("c(3, 1, 2) |> sort()", "1 2 3"),
                    ("c(1, 2, 3) |> sum()", "6"),
                    ("c(1, 2, 3) |> length()", "3"),
                    ("4 |> sqrt", "2"),
                    ("c(1, 2) |> rep(2)", "1 2 1 2")]);
}

// --- Rendering ---

#[test]
fn value_rendering() {
    assert_values(&[("NULL", "NULL"),
                    ("NA", "NA"),
                    ("1/0", "Inf"),
                    ("-1/0", "-Inf"),
                    ("0/0", "NaN"),
                    ("\"quoted\"", "\"quoted\""),
                    ("function(x) x", "<function>")]);
    assert_eq!(value_of("list(1, \"a\")"), "list(\n  [[1]] 1,\n  [[2]] \"a\"\n)");
    assert!(value_of("print").starts_with("<builtin:"));
}

// --- Parsing details ---

#[test]
fn separators_and_comments() {
    assert_values(&[("1 + 1; 2 + 2", "4"),
                    ("# just a comment\n1 + 1", "2"),
                    ("x <- 1\n\n\nx", "1"),
                    ("length(c(1,\n2))", "2"),
                    ("`odd name` <- 4\n`odd name`", "4")]);
}

#[test]
fn stray_commas_in_calls_are_tolerated() {
    assert_values(&[("sum(1, , 2)", "3"), ("sum(1, 2, )", "3")]);
}

#[test]
fn parse_errors_are_reported() {
    assert!(error_of("x <- ").contains("Unexpected token"));
    assert!(error_of("f(").contains("Expected next token"));
    assert!(error_of("(1 + 2").contains("Expected next token )"));
}

// --- Host interop ---

#[test]
fn json_conversion() {
    let value = |src: &str| {
        let ctx = Context::new();
        ctx.eval_source(src).unwrap().value
    };
    assert_eq!(to_json(&value("42")), serde_json::json!(42));
    assert_eq!(to_json(&value("c(1.5, NA, 3)")), serde_json::json!([1.5, null, 3.0]));
    assert_eq!(to_json(&value("c(1, NA, 3)")), serde_json::json!([1, null, 3]));
    assert_eq!(to_json(&value("\"hi\"")), serde_json::json!("hi"));
    assert_eq!(to_json(&value("NULL")), serde_json::json!(null));
    assert_eq!(to_json(&value("TRUE")), serde_json::json!(true));
    assert_eq!(to_json(&value("NA")), serde_json::json!(null));
    assert_eq!(to_json(&value("list(a = 1, b = c(2, 3))")),
               serde_json::json!({"a": 1, "b": [2, 3]}));
    assert_eq!(to_json(&value("list(1, 2)")), serde_json::json!([1, 2]));
}

#[test]
fn context_state_persists_across_evaluations() {
    let ctx = Context::new();
    ctx.eval_source("counter <- 0").unwrap();
    ctx.eval_source("counter <- counter + 1").unwrap();
    let out = ctx.eval_source("counter").unwrap();
    assert_eq!(out.value.to_string(), "1");
}

#[test]
fn top_level_return_ends_the_program() {
    assert_eq!(value_of("return(5)\nstop(\"unreached\")"), "5");
}
