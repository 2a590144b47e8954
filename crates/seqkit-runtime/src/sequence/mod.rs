//! Sequences: 1-indexed, contiguous, shared storage
//!
//! A [`Sequence`] is a handle over `Rc<RefCell<Vec<Value>>>`. Cloning the
//! handle (or wrapping existing storage) aliases the storage, so mutating
//! methods are visible through every alias. Copying methods always allocate
//! fresh storage and carry the receiver's [`Options`] over to the result.
//!
//! Positions are 1-based at the API. Internally everything is 0-based; the
//! conversion happens once, at the method boundary.
//!
//! Callbacks run with no borrow of the storage held, so a callback may read
//! or mutate the sequence it is handed.

mod mutate;
mod query;
mod reduce;
mod transform;

use crate::callback::{normalize_with, Callable, Callback, Template};
use crate::error::{SeqError, SeqResult};
use crate::options::Options;
use crate::table::Table;
use crate::value::{eq_assuming, render_element, Value, RENDER_DEPTH};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Ordered, 1-indexed collection of values over shared storage
#[derive(Clone)]
pub struct Sequence {
    storage: Rc<RefCell<Vec<Value>>>,
    options: Rc<Options>,
}

impl Sequence {
    // === Construction ===

    /// View over existing storage. Nothing is copied or validated.
    pub fn wrap(storage: Rc<RefCell<Vec<Value>>>) -> Self {
        Self::wrap_with(storage, Rc::new(Options::default()))
    }

    /// View over existing storage with explicit options
    pub fn wrap_with(storage: Rc<RefCell<Vec<Value>>>, options: Rc<Options>) -> Self {
        Self { storage, options }
    }

    /// Take ownership of `values` as fresh storage
    pub fn new(values: Vec<Value>) -> Self {
        Self::wrap(Rc::new(RefCell::new(values)))
    }

    /// Build from anything convertible to values
    pub fn of<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// Copying constructor: fresh storage, the source is not aliased
    pub fn from_values(values: &[Value]) -> Self {
        Self::new(values.to_vec())
    }

    /// Copying constructor with a map-template callback `(x, i)`
    pub fn from_mapped(values: &[Value], callback: impl Into<Callback>) -> SeqResult<Self> {
        Self::from_mapped_with(values, callback, Options::default())
    }

    pub fn from_mapped_with(
        values: &[Value],
        callback: impl Into<Callback>,
        options: Options,
    ) -> SeqResult<Self> {
        let map = normalize_with(callback, Template::Map, &options)?;
        let mapped = values
            .iter()
            .enumerate()
            .map(|(pos, x)| map.call(&[x.clone(), position(pos)]))
            .collect::<SeqResult<Vec<_>>>()?;
        Ok(Self::wrap_with(
            Rc::new(RefCell::new(mapped)),
            Rc::new(options),
        ))
    }

    /// Validate an untyped table and copy its values into a typed sequence.
    ///
    /// Fails with [`SeqError::NotASequence`] when the keys are not exactly
    /// `1..=N`.
    pub fn validate(table: &Table) -> SeqResult<Self> {
        match table.check_list() {
            Ok(_) => Ok(Self::new(table.list_values())),
            Err(violation) => Err(SeqError::NotASequence {
                reason: violation.to_string(),
            }),
        }
    }

    /// Alias of this storage that runs under different options
    pub fn with_options(&self, options: Options) -> Self {
        Self::wrap_with(self.storage.clone(), Rc::new(options))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Handle to the backing storage
    pub fn storage(&self) -> Rc<RefCell<Vec<Value>>> {
        self.storage.clone()
    }

    /// Whether both handles view the same storage
    pub fn same_storage(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    // === Helpers shared by the method families ===

    /// Address of the shared storage, for cycle detection
    pub(crate) fn storage_id(&self) -> usize {
        Rc::as_ptr(&self.storage) as *const () as usize
    }

    /// Element at 0-based `pos`, read without holding a borrow
    pub(crate) fn element(&self, pos: usize) -> Option<Value> {
        self.storage.borrow().get(pos).cloned()
    }

    /// New sequence over `values`, inheriting this sequence's options
    pub(crate) fn derive(&self, values: Vec<Value>) -> Sequence {
        Self::wrap_with(Rc::new(RefCell::new(values)), self.options.clone())
    }

    pub(crate) fn callable(
        &self,
        callback: impl Into<Callback>,
        template: Template,
    ) -> SeqResult<Callable> {
        normalize_with(callback, template, &self.options)
    }

    /// `(x, i, self)` for the element at 0-based `pos`
    pub(crate) fn element_args(&self, pos: usize) -> [Value; 3] {
        [
            self.element(pos).unwrap_or_default(),
            position(pos),
            Value::Sequence(self.clone()),
        ]
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth >= RENDER_DEPTH {
            return write!(f, "Array{{...}}");
        }
        write!(f, "Array{{")?;
        for (i, value) in self.to_vec().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            render_element(value, f, depth + 1)?;
        }
        write!(f, "}}")
    }
}

/// 1-based index value for 0-based `pos`
pub(crate) fn position(pos: usize) -> Value {
    Value::from(pos + 1)
}

/// Resolve a possibly negative 1-based index: `-1` is the last element.
/// The result is not clamped.
pub(crate) fn resolve_index(index: i64, len: usize) -> i64 {
    if index < 0 {
        len as i64 + index + 1
    } else {
        index
    }
}

/// Resolve an inclusive 1-based `[start, end]` range and clamp it to the
/// sequence. Returns a 0-based half-open range, empty when nothing is left.
pub(crate) fn clamp_range(start: Option<i64>, end: Option<i64>, len: usize) -> std::ops::Range<usize> {
    let start = resolve_index(start.unwrap_or(1), len).max(1);
    let end = resolve_index(end.unwrap_or(len as i64), len).min(len as i64);
    if start > end {
        0..0
    } else {
        (start - 1) as usize..end as usize
    }
}

/// Structural list test.
///
/// Typed sequences pass by construction. A table passes when its keys are
/// exactly `1..=N` (the empty table included). Everything else fails.
pub fn is_sequence(value: &Value) -> bool {
    match value {
        Value::Sequence(_) => true,
        Value::Table(table) => table.is_list(),
        _ => false,
    }
}

/// Elements of a sequence-shaped value: a typed sequence or a list-shaped table
pub(crate) fn list_items(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Sequence(seq) => Some(seq.to_vec()),
        Value::Table(table) if table.is_list() => Some(table.list_values()),
        _ => None,
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (Value::Sequence(self.clone()), Value::Sequence(other.clone()));
        eq_assuming(&a, &b, &mut HashSet::new())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<Vec<Value>> for Sequence {
    fn from(values: Vec<Value>) -> Self {
        Sequence::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq;
    use crate::table::Key;

    #[test]
    fn test_wrap_aliases_storage() {
        let storage = Rc::new(RefCell::new(vec![Value::from(1)]));
        let seq = Sequence::wrap(storage.clone());
        seq.push([Value::from(2)]);
        assert_eq!(storage.borrow().len(), 2);
    }

    #[test]
    fn test_clone_is_alias() {
        let a = seq![1, 2];
        let b = a.clone();
        b.pop();
        assert_eq!(a.len(), 1);
        assert!(a.same_storage(&b));
    }

    #[test]
    fn test_from_values_copies() {
        let source = vec![Value::from(1), Value::from(2)];
        let seq = Sequence::from_values(&source);
        seq.push([Value::from(3)]);
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_from_mapped_uses_map_template() {
        let seq = Sequence::from_mapped(&[Value::from(5), Value::from(6)], "x * i").unwrap();
        assert_eq!(seq, seq![5, 12]);
    }

    #[test]
    fn test_validate() {
        let table = Table::list([Value::from(1), Value::from("a")]);
        assert_eq!(Sequence::validate(&table).unwrap(), seq![1, "a"]);

        let gap = Table::list([Value::from(1), Value::Nil, Value::from(3)]);
        let err = Sequence::validate(&gap).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not a sequence: missing index 2 (found key 3)"
        );
    }

    #[test]
    fn test_is_sequence() {
        assert!(is_sequence(&Value::from(seq![])));
        assert!(is_sequence(&Value::from(Table::new())));
        assert!(!is_sequence(&Value::from(1)));

        let table = Table::new();
        table.set(Key::from("x"), Value::from(1));
        assert!(!is_sequence(&Value::from(table)));
    }

    #[test]
    fn test_derived_sequences_inherit_options() {
        let seq = seq![1, 2].with_options(Options::native_only());
        assert!(!seq.slice(None, None).options().text_callbacks);
    }

    #[test]
    fn test_display() {
        let nested = seq![1, "a"];
        let seq = seq![1, 2.5, nested, true];
        assert_eq!(seq.to_string(), r#"Array{1, 2.5, Array{1, "a"}, true}"#);
        assert_eq!(seq![].to_string(), "Array{}");
    }

    #[test]
    fn test_display_of_self_reference_terminates() {
        let seq = seq![1];
        seq.push([Value::from(seq.clone())]);
        assert!(seq.to_string().contains("Array{...}"));
    }

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(None, None, 4), 0..4);
        assert_eq!(clamp_range(Some(2), Some(3), 4), 1..3);
        assert_eq!(clamp_range(Some(-2), None, 4), 2..4);
        assert_eq!(clamp_range(Some(0), Some(99), 4), 0..4);
        assert_eq!(clamp_range(Some(3), Some(2), 4), 0..0);
    }
}
