//! In-place mutation
//!
//! These methods change the shared storage, so every alias sees the result.
//! Range arguments accept negative indices and are clamped to the sequence.

use super::{clamp_range, resolve_index, Sequence};
use crate::error::{SeqError, SeqResult};
use crate::options::OverlapMode;
use crate::value::Value;
use std::cmp::Ordering;

impl Sequence {
    /// Append values in argument order; returns the new length
    pub fn push(&self, values: impl IntoIterator<Item = Value>) -> usize {
        let values: Vec<Value> = values.into_iter().collect();
        let mut items = self.storage.borrow_mut();
        items.extend(values);
        items.len()
    }

    /// Prepend values, keeping their argument order; returns the new length
    pub fn unshift(&self, values: impl IntoIterator<Item = Value>) -> usize {
        let values: Vec<Value> = values.into_iter().collect();
        let mut items = self.storage.borrow_mut();
        items.splice(0..0, values);
        items.len()
    }

    /// Remove and return the last element
    pub fn pop(&self) -> Option<Value> {
        self.storage.borrow_mut().pop()
    }

    /// Remove and return the first element
    pub fn shift(&self) -> Option<Value> {
        let mut items = self.storage.borrow_mut();
        if items.is_empty() {
            None
        } else {
            Some(items.remove(0))
        }
    }

    /// Overwrite the inclusive range `[start, end]` with `value`
    pub fn fill(&self, value: Value, start: Option<i64>, end: Option<i64>) -> &Self {
        let mut items = self.storage.borrow_mut();
        let range = clamp_range(start, end, items.len());
        for slot in &mut items[range] {
            *slot = value.clone();
        }
        drop(items);
        self
    }

    /// Copy `[start, end]` so that it begins at `target`.
    ///
    /// Under [`OverlapMode::Forward`] slots are copied one by one from the
    /// front, so a target inside the source range re-reads slots it has
    /// already written. [`OverlapMode::Memmove`] reads the whole source
    /// range first. Writes never extend the sequence.
    pub fn copy_within(&self, target: i64, start: i64, end: Option<i64>) -> &Self {
        let mut items = self.storage.borrow_mut();
        let len = items.len();
        let source = clamp_range(Some(start), end, len);
        let target = resolve_index(target, len).max(1) as usize - 1;
        if target >= len || source.is_empty() {
            return self;
        }
        let count = source.len().min(len - target);

        match self.options.overlap {
            OverlapMode::Forward => {
                for k in 0..count {
                    let value = items[source.start + k].clone();
                    items[target + k] = value;
                }
            }
            OverlapMode::Memmove => {
                let copied = items[source.start..source.start + count].to_vec();
                items[target..target + count].clone_from_slice(&copied);
            }
        }
        drop(items);
        self
    }

    pub fn reverse(&self) -> &Self {
        self.storage.borrow_mut().reverse();
        self
    }

    /// Stable sort in natural order (see [`Value::natural_cmp`])
    pub fn sort(&self) -> &Self {
        let sorted = merge_sort(self.to_vec(), &mut |a: &Value, b: &Value| Ok(a.natural_cmp(b)));
        if let Ok(sorted) = sorted {
            *self.storage.borrow_mut() = sorted;
        }
        self
    }

    /// Stable sort with a comparator.
    ///
    /// The comparator answers "does `a` sort before `b`": `true` or a
    /// negative number means yes, a positive number means `b` first, `0`
    /// means equal. For `false` or `nil` the arguments are swapped and asked
    /// again to tell "after" from "equal". Any other result is a type error.
    ///
    /// The comparator runs against a snapshot; the storage is replaced only
    /// once sorting has finished, and not at all on error.
    pub fn sort_by<F>(&self, mut compare: F) -> SeqResult<&Self>
    where
        F: FnMut(&Value, &Value) -> SeqResult<Value>,
    {
        let mut order = |a: &Value, b: &Value| -> SeqResult<Ordering> {
            match comparator_answer(compare(a, b)?)? {
                Some(ordering) => Ok(ordering),
                None => match comparator_answer(compare(b, a)?)? {
                    Some(Ordering::Less) => Ok(Ordering::Greater),
                    _ => Ok(Ordering::Equal),
                },
            }
        };
        let sorted = merge_sort(self.to_vec(), &mut order)?;
        *self.storage.borrow_mut() = sorted;
        Ok(self)
    }

    /// Remove `delete_count` elements at `start` (all remaining when `None`)
    /// and insert `items` in their place. `start` is clamped to `1..=len + 1`.
    pub fn splice(&self, start: i64, delete_count: Option<usize>, items: Vec<Value>) -> &Self {
        let mut storage = self.storage.borrow_mut();
        let len = storage.len();
        let begin = (resolve_index(start, len).clamp(1, len as i64 + 1) - 1) as usize;
        let remaining = len - begin;
        let count = delete_count.map_or(remaining, |n| n.min(remaining));
        storage.splice(begin..begin + count, items);
        drop(storage);
        self
    }
}

/// Interpret a comparator result; `None` asks for the swapped comparison
fn comparator_answer(result: Value) -> SeqResult<Option<Ordering>> {
    match result {
        Value::Bool(true) => Ok(Some(Ordering::Less)),
        Value::Bool(false) | Value::Nil => Ok(None),
        Value::Number(n) if n < 0.0 => Ok(Some(Ordering::Less)),
        Value::Number(n) if n > 0.0 => Ok(Some(Ordering::Greater)),
        Value::Number(_) => Ok(Some(Ordering::Equal)),
        other => Err(SeqError::type_error(format!(
            "comparator returned a {} value",
            other.type_name()
        ))),
    }
}

/// Stable top-down merge sort with a fallible comparison.
///
/// Used instead of `slice::sort_by` so that an inconsistent user comparator
/// yields some permutation rather than a panic.
fn merge_sort<F>(mut values: Vec<Value>, compare: &mut F) -> SeqResult<Vec<Value>>
where
    F: FnMut(&Value, &Value) -> SeqResult<Ordering>,
{
    if values.len() <= 1 {
        return Ok(values);
    }
    let right = values.split_off(values.len() / 2);
    let left = merge_sort(values, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        // take from the right only when strictly smaller, which keeps ties stable
        if compare(r, l)? == Ordering::Less {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}
