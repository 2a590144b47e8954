//! Untyped tables and the structural list test
//!
//! A [`Table`] is an arbitrary key/value collection, the interop form of
//! "some collection handed to us from outside". It is a list exactly when its
//! keys are the integers `1..=N` with no gaps. Typed [`Sequence`]s carry that
//! invariant by construction; tables have to be scanned.
//!
//! [`Sequence`]: crate::Sequence

use crate::value::{eq_assuming, format_number, render_element, Value, RENDER_DEPTH};
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Table key. Integral floats and integers are the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Number(OrderedFloat<f64>),
    String(Rc<str>),
    Bool(bool),
}

impl Key {
    /// Key for a 1-based position
    pub fn int(i: i64) -> Self {
        Key::Number(OrderedFloat(i as f64))
    }

    /// Convert a value into a key. `nil`, NaN, sequences and tables are not keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if !n.is_nan() => Some(Key::Number(OrderedFloat(*n))),
            Value::String(s) => Some(Key::String(s.clone())),
            Value::Bool(b) => Some(Key::Bool(*b)),
            _ => None,
        }
    }

    /// The integer this key stands for, if it is integral
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Key::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(n.0 as i64),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Number(n) => Value::Number(n.0),
            Key::String(s) => Value::String(s.clone()),
            Key::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::int(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(Rc::from(s))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Number(n) => format_number(n.0, f),
            Key::String(s) => write!(f, "{:?}", s),
            Key::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Why a table failed the structural list test
#[derive(Debug, Clone, PartialEq)]
pub enum ListViolation {
    /// Index `missing` is absent while `stray` lies outside `1..=N`
    Gap { missing: i64, stray: Key },
}

impl fmt::Display for ListViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListViolation::Gap { missing, stray } => {
                write!(f, "missing index {} (found key {})", missing, stray)
            }
        }
    }
}

/// Shared, mutable, untyped key/value collection
#[derive(Clone, Default)]
pub struct Table(Rc<RefCell<BTreeMap<Key, Value>>>);

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional constructor: values get keys 1, 2, 3... and `nil` slots are
    /// left unpopulated, so `[1, 2, nil, 4]` has keys `{1, 2, 4}`.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        let map = values
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nil())
            .map(|(i, v)| (Key::int(i as i64 + 1), v))
            .collect();
        Table(Rc::new(RefCell::new(map)))
    }

    /// Build from key/value pairs; `nil` values are skipped
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Key, Value)>) -> Self {
        let map = pairs.into_iter().filter(|(_, v)| !v.is_nil()).collect();
        Table(Rc::new(RefCell::new(map)))
    }

    /// Read a key; absent keys read as `nil`
    pub fn get(&self, key: &Key) -> Value {
        self.0.borrow().get(key).cloned().unwrap_or_default()
    }

    /// Write a key; writing `nil` removes it
    pub fn set(&self, key: Key, value: Value) {
        let mut map = self.0.borrow_mut();
        if value.is_nil() {
            map.remove(&key);
        } else {
            map.insert(key, value);
        }
    }

    /// Number of populated keys
    pub fn key_count(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Largest `n` such that `1..=n` are all populated
    pub fn border(&self) -> usize {
        let map = self.0.borrow();
        let mut n = 0;
        while map.contains_key(&Key::int(n as i64 + 1)) {
            n += 1;
        }
        n
    }

    /// Structural list test: O(N) scan over `1..=N` with early exit.
    ///
    /// With `N` populated keys, the keys are exactly `{1..N}` iff every index
    /// in `1..=N` is present. Returns `N` on success.
    pub fn check_list(&self) -> Result<usize, ListViolation> {
        let map = self.0.borrow();
        let n = map.len();
        for i in 1..=n as i64 {
            if !map.contains_key(&Key::int(i)) {
                // N keys with one of 1..=N missing: some key lies outside.
                let stray = map
                    .keys()
                    .find(|k| !matches!(k.as_index(), Some(j) if j >= 1 && j <= n as i64))
                    .cloned()
                    .unwrap_or_else(|| Key::int(i));
                return Err(ListViolation::Gap { missing: i, stray });
            }
        }
        Ok(n)
    }

    /// Whether the table passes the structural list test
    pub fn is_list(&self) -> bool {
        self.check_list().is_ok()
    }

    /// Values at `1..=border()`, in order
    pub fn list_values(&self) -> Vec<Value> {
        let map = self.0.borrow();
        (1..)
            .map_while(|i| map.get(&Key::int(i)).cloned())
            .collect()
    }

    /// Snapshot of every entry in key order
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Whether both handles share storage
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared storage, for cycle detection
    pub(crate) fn storage_id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth >= RENDER_DEPTH {
            return write!(f, "Table{{...}}");
        }
        write!(f, "Table{{")?;
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}] = ", key)?;
            render_element(value, f, depth + 1)?;
        }
        write!(f, "}}")
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (Value::Table(self.clone()), Value::Table(other.clone()));
        eq_assuming(&a, &b, &mut HashSet::new())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
