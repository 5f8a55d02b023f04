/// Assignment forms, including copy-on-write subset and `$` writes.
pub mod assign;
/// Vectorized binary operators, sequences, comparisons and membership.
pub mod binary;
/// The built-in function library installed into every new context.
pub mod builtins;
/// Call evaluation: lazy arguments, dots splicing and closure binding.
pub mod call;
/// Coercions between vector types and scalar extraction helpers.
pub mod coerce;
/// The evaluation context, control-flow signals and the eval dispatcher.
pub mod core;
/// Parent-chained environments.
pub mod env;
/// The subset engine: index normalization and read operations.
pub mod subset;
/// Unary operators.
pub mod unary;
