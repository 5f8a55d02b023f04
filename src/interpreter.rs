/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator traverses the AST, evaluates expressions, performs
/// vectorized arithmetic and logical operations, manages environments and
/// promises, and produces results and printed output. It is the core
/// execution engine of the interpreter.
///
/// # Responsibilities
/// - Evaluates AST nodes, performing all supported operations.
/// - Handles environments, closures, lazy arguments and control flow.
/// - Reports runtime errors such as failed lookups or invalid coercions.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// corresponding to meaningful language elements such as numbers, strings,
/// identifiers, operators, delimiters and keywords. Newlines are contextual
/// statement separators resolved against nesting depth.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with source positions.
/// - Handles numeric and string literals, identifiers, and operators.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// an AST using Pratt-style precedence climbing. Statement separators are
/// newlines and semicolons; recovery advances to the next separator so a
/// single program can report its first error and keep going.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes.
/// - Validates grammar, including assignment targets and argument lists.
/// - Rewrites the pipe operator into calls at parse time.
pub mod parser;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares all value types used during execution: NA-tracking
/// atomic vectors, heterogeneous lists, captured expressions, promises, dots
/// and callables, each carrying an attribute map. It also provides the
/// rendering used by `print` and the JSON conversion for host interop.
pub mod value;
