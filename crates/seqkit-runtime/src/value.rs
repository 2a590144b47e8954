//! Runtime value representation
//!
//! - Nil, Bools, Numbers: immediate values
//! - Strings: reference-counted, immutable (`Rc<str>`)
//! - Sequences: shared handles; clones alias the same storage
//! - Tables: untyped key/value collections, shared handles
//!
//! Everything here is single-threaded. Handles are `Rc`, so values are `!Send`.

use crate::sequence::Sequence;
use crate::table::Table;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Nesting limit for display and ordering of self-referential structures
pub(crate) const RENDER_DEPTH: usize = 32;

/// Runtime value type
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,
    /// Boolean value
    Bool(bool),
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Rc<str>),
    /// Typed sequence handle
    Sequence(Sequence),
    /// Untyped table handle
    Table(Table),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Table(_) => "table",
        }
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Structural list test; see [`crate::is_sequence`]
    pub fn is_sequence(&self) -> bool {
        crate::sequence::is_sequence(self)
    }

    /// Total natural order used by `sort()` without a comparator.
    ///
    /// Values of different types order by type: nil, boolean, number,
    /// string, sequence, table. Numbers use `f64::total_cmp`, strings compare
    /// lexicographically, sequences element-wise. Tables of equal type rank
    /// compare equal.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        natural_cmp_at(self, other, 0)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Sequence(_) => 4,
            Value::Table(_) => 5,
        }
    }
}

fn natural_cmp_at(a: &Value, b: &Value, depth: usize) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Sequence(x), Value::Sequence(y)) if depth < RENDER_DEPTH => {
            let (xs, ys) = (x.to_vec(), y.to_vec());
            for (l, r) in xs.iter().zip(ys.iter()) {
                match natural_cmp_at(l, r, depth + 1) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Format a number without a trailing `.0` for whole values
pub(crate) fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.fract() == 0.0 && n.is_finite() {
        write!(f, "{:.0}", n)
    } else {
        write!(f, "{}", n)
    }
}

/// Render a value nested inside a sequence or table: strings are quoted and
/// collections share the caller's depth budget.
pub(crate) fn render_element(value: &Value, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{:?}", s),
        Value::Sequence(seq) => seq.render(f, depth),
        Value::Table(table) => table.render(f, depth),
        other => write!(f, "{}", other),
    }
}

impl PartialEq for Value {
    /// Primitives compare by value; sequences and tables compare by content
    /// (aliases of the same storage are trivially equal).
    fn eq(&self, other: &Self) -> bool {
        eq_assuming(self, other, &mut HashSet::new())
    }
}

/// Structural equality that terminates on self-referential containers.
///
/// A pair of containers already under comparison is assumed equal when it
/// is reached again. Equality is a pure conjunction, so any difference found
/// elsewhere still makes the whole comparison false.
pub(crate) fn eq_assuming(a: &Value, b: &Value, assumed: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Sequence(x), Value::Sequence(y)) => {
            if x.same_storage(y) || !assumed.insert((x.storage_id(), y.storage_id())) {
                return true;
            }
            let (xs, ys) = (x.to_vec(), y.to_vec());
            xs.len() == ys.len()
                && xs.iter().zip(&ys).all(|(l, r)| eq_assuming(l, r, assumed))
        }
        (Value::Table(x), Value::Table(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.storage_id(), y.storage_id())) {
                return true;
            }
            let (xs, ys) = (x.entries(), y.entries());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|((lk, lv), (rk, rv))| lk == rk && eq_assuming(lv, rv, assumed))
        }
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(seq) => write!(f, "{}", seq),
            Value::Table(table) => write!(f, "{}", table),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Sequence(seq) => write!(f, "Sequence({})", seq),
            Value::Table(table) => write!(f, "Table({})", table),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}
