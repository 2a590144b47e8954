//! Seqkit Runtime - 1-indexed sequences with a JavaScript-Array method set
//!
//! This library provides:
//! - `Sequence`: a shared, 1-indexed, contiguous collection of dynamic values
//! - The structural list test for untyped tables (`is_sequence`, `Sequence::validate`)
//! - Callback normalization: native closures or sandboxed expression text,
//!   bound through one of four parameter templates
//! - The query, transformation, mutation and reduction method families
//! - JSON interop

/// Seqkit runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod callback;
pub mod error;
pub mod expr;
pub mod json;
pub mod options;
pub mod sequence;
pub mod span;
pub mod table;
pub mod value;

pub use callback::{normalize, normalize_with, Callable, Callback, NativeFn, Template};
pub use error::{SeqError, SeqResult};
pub use options::{FalsyPolicy, Options, OverlapMode};
pub use sequence::{is_sequence, Sequence};
pub use span::Span;
pub use table::{Key, ListViolation, Table};
pub use value::Value;

/// Build a [`Sequence`] from a list of values convertible with `Value::from`
///
/// ```
/// use seqkit_runtime::{seq, Value};
///
/// let s = seq![1, "two", 3.5];
/// assert_eq!(s.get(2), Some(Value::from("two")));
/// ```
#[macro_export]
macro_rules! seq {
    ($($x:expr),* $(,)?) => {
        $crate::Sequence::new(vec![$($crate::Value::from($x)),*])
    };
}
