//! Copying transformations
//!
//! Every method here builds new storage and returns a new sequence; the
//! receiver is never touched. A failing callback aborts the build and the
//! partial result is dropped.

use super::{clamp_range, list_items, position, resolve_index, Sequence};
use crate::callback::{Callback, Template};
use crate::error::{SeqError, SeqResult};
use crate::options::Options;
use crate::value::Value;

impl Sequence {
    /// Receiver's elements followed by each item; sequence-shaped items are
    /// inlined one level.
    pub fn concat(&self, items: impl IntoIterator<Item = Value>) -> Sequence {
        let mut out = self.to_vec();
        for item in items {
            match list_items(&item) {
                Some(inner) => out.extend(inner),
                None => out.push(item),
            }
        }
        self.derive(out)
    }

    /// Elements whose element test is truthy, in order
    pub fn filter(&self, callback: impl Into<Callback>) -> SeqResult<Sequence> {
        let test = self.callable(callback, Template::ElementTest)?;
        let mut out = Vec::new();
        for pos in 0..self.len() {
            let args = self.element_args(pos);
            if test.call(&args)?.is_truthy() {
                let [x, _, _] = args;
                out.push(x);
            }
        }
        Ok(self.derive(out))
    }

    /// One result per element; the callback binds `(x, i, self)`
    pub fn map(&self, callback: impl Into<Callback>) -> SeqResult<Sequence> {
        let f = self.callable(callback, Template::ElementTest)?;
        let out = (0..self.len())
            .map(|pos| f.call(&self.element_args(pos)))
            .collect::<SeqResult<Vec<_>>>()?;
        Ok(self.derive(out))
    }

    /// Inline nested sequences up to `depth` levels (default 1).
    ///
    /// A negative depth wraps the receiver as the only element of the result.
    /// Non-sequence values that the falsy policy rejects are dropped.
    pub fn flat(&self, depth: Option<i64>) -> Sequence {
        let depth = depth.unwrap_or(1);
        if depth < 0 {
            return self.derive(vec![Value::Sequence(self.clone())]);
        }
        let mut out = Vec::new();
        let mut path = vec![self.storage_id()];
        flatten_into(&mut out, self.to_vec(), depth, &self.options, &mut path);
        self.derive(out)
    }

    /// Map with `(x, i)` and inline sequence-shaped results one level
    pub fn flat_map(&self, callback: impl Into<Callback>) -> SeqResult<Sequence> {
        let f = self.callable(callback, Template::Map)?;
        let mut out = Vec::new();
        for pos in 0..self.len() {
            let x = self.element(pos).unwrap_or_default();
            let result = f.call(&[x, position(pos)])?;
            match list_items(&result) {
                Some(inner) => out.extend(inner),
                None => out.push(result),
            }
        }
        Ok(self.derive(out))
    }

    /// Inclusive 1-based range `[start, end]`, clamped to the sequence
    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> Sequence {
        let items = self.storage.borrow();
        let range = clamp_range(start, end, items.len());
        let out = items[range].to_vec();
        drop(items);
        self.derive(out)
    }

    /// Copy with the element at `index` replaced.
    ///
    /// `index` may be negative (counting from the end) or `len + 1`, which
    /// appends. Anything else is [`SeqError::OutOfBounds`].
    pub fn with(&self, index: i64, value: Value) -> SeqResult<Sequence> {
        let mut out = self.to_vec();
        let len = out.len();
        match resolve_index(index, len) {
            i if i >= 1 && i <= len as i64 => out[i as usize - 1] = value,
            i if i == len as i64 + 1 => out.push(value),
            _ => return Err(SeqError::OutOfBounds { index, len }),
        }
        Ok(self.derive(out))
    }

    pub fn to_reversed(&self) -> Sequence {
        let mut out = self.to_vec();
        out.reverse();
        self.derive(out)
    }

    /// Sorted copy in natural order
    pub fn to_sorted(&self) -> Sequence {
        let copy = self.derive(self.to_vec());
        copy.sort();
        copy
    }

    /// Sorted copy using a comparator; see [`Sequence::sort_by`]
    pub fn to_sorted_by<F>(&self, compare: F) -> SeqResult<Sequence>
    where
        F: FnMut(&Value, &Value) -> SeqResult<Value>,
    {
        let copy = self.derive(self.to_vec());
        copy.sort_by(compare)?;
        Ok(copy)
    }

    /// Copy with a splice applied; see [`Sequence::splice`]
    pub fn to_spliced(
        &self,
        start: i64,
        delete_count: Option<usize>,
        items: Vec<Value>,
    ) -> Sequence {
        let copy = self.derive(self.to_vec());
        copy.splice(start, delete_count, items);
        copy
    }

    /// Textual forms of the elements with `separator` between them.
    ///
    /// Nested sequences and tables have no flat textual form and are rejected.
    pub fn join(&self, separator: &str) -> SeqResult<String> {
        let items = self.storage.borrow();
        let mut parts = Vec::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            match item {
                Value::Sequence(_) | Value::Table(_) => {
                    return Err(SeqError::type_error(format!(
                        "cannot join a {} at index {}",
                        item.type_name(),
                        pos + 1
                    )))
                }
                other => parts.push(other.to_string()),
            }
        }
        Ok(parts.join(separator))
    }
}

/// `path` holds the storage of every collection being flattened above
/// `items`; a collection found on it is kept whole instead of descended into.
fn flatten_into(
    out: &mut Vec<Value>,
    items: Vec<Value>,
    depth: i64,
    options: &Options,
    path: &mut Vec<usize>,
) {
    for item in items {
        if depth > 0 {
            if let (Some(id), Some(inner)) = (storage_id(&item), list_items(&item)) {
                if !path.contains(&id) {
                    path.push(id);
                    flatten_into(out, inner, depth - 1, options, path);
                    path.pop();
                    continue;
                }
                tracing::trace!("flat kept a collection that contains itself");
            }
        }
        if options.flat_drops(&item) {
            tracing::trace!(value = %item, "flat dropped a falsy element");
            continue;
        }
        out.push(item);
    }
}

fn storage_id(value: &Value) -> Option<usize> {
    match value {
        Value::Sequence(seq) => Some(seq.storage_id()),
        Value::Table(table) => Some(table.storage_id()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SeqError;
    use crate::options::{FalsyPolicy, Options};
    use crate::seq;
    use crate::table::Table;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_concat_flattens_one_level() {
        let s = seq![1];
        let out = s.concat([
            Value::from(seq![2, seq![3]]),
            Value::from(4),
            Value::from(Table::list([Value::from(5)])),
        ]);
        assert_eq!(out, seq![1, 2, seq![3], 4, 5]);
        assert_eq!(s, seq![1]);
    }

    #[test]
    fn test_filter_and_map() {
        let s = seq![1, 2, 3, 4];
        assert_eq!(s.filter("x % 2 == 0").unwrap(), seq![2, 4]);
        assert_eq!(s.map("x * i").unwrap(), seq![1, 4, 9, 16]);
        assert_eq!(s, seq![1, 2, 3, 4]);
    }

    #[test]
    fn test_flat_depths() {
        let s = seq![1, seq![2, seq![3, seq![4]]]];
        assert_eq!(s.flat(Some(0)), s);
        assert_eq!(s.flat(None), seq![1, 2, seq![3, seq![4]]]);
        assert_eq!(s.flat(Some(2)), seq![1, 2, 3, seq![4]]);
        assert_eq!(s.flat(Some(99)), seq![1, 2, 3, 4]);
    }

    #[test]
    fn test_flat_negative_depth_wraps() {
        let s = seq![1, seq![2]];
        let out = s.flat(Some(-1));
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(1), Some(Value::from(s.clone())));
    }

    #[test]
    fn test_flat_drops_falsy_by_default() {
        let s = seq![1, false, seq![true, false], 0];
        assert_eq!(s.flat(None), seq![1, true, 0]);
    }

    #[test]
    fn test_flat_keeps_false_when_configured() {
        let s = seq![1, false, Value::Nil].with_options(Options {
            flat_falsy: FalsyPolicy::DropNil,
            ..Options::default()
        });
        assert_eq!(s.flat(None), seq![1, false]);
    }

    #[test]
    fn test_full_flat_keeps_self_references_whole() {
        let a = seq![1];
        a.push([Value::from(a.clone())]);
        let out = a.flat(Some(i64::MAX));
        assert_eq!(out.len(), 2);
        assert!(matches!(out.get(2), Some(Value::Sequence(inner)) if inner.same_storage(&a)));

        // a -> b -> a
        let b = seq![2];
        let c = seq![1, b.clone()];
        b.push([Value::from(c.clone())]);
        let out = c.flat(Some(i64::MAX));
        assert_eq!(out.len(), 3);
        assert!(matches!(out.get(3), Some(Value::Sequence(inner)) if inner.same_storage(&c)));
    }

    #[test]
    fn test_flat_map() {
        let s = seq![1, 2];
        let out = s
            .flat_map(crate::Callback::native(|args| {
                Ok(Value::from(seq![args[0].clone(), args[1].clone()]))
            }))
            .unwrap();
        assert_eq!(out, seq![1, 1, 2, 2]);
        assert_eq!(s.flat_map("x .. ''").unwrap(), seq!["1", "2"]);
    }

    #[test]
    fn test_slice() {
        let s = seq![1, 2, 3, 4, 5];
        assert_eq!(s.slice(Some(2), Some(4)), seq![2, 3, 4]);
        assert_eq!(s.slice(Some(4), None), seq![4, 5]);
        assert_eq!(s.slice(Some(-2), None), seq![4, 5]);
        assert_eq!(s.slice(Some(0), Some(10)), s);
        assert_eq!(s.slice(Some(4), Some(2)), seq![]);
        assert!(!s.slice(None, None).same_storage(&s));
    }

    #[test]
    fn test_with() {
        let s = seq![1, 2, 3];
        assert_eq!(s.with(2, Value::from(9)).unwrap(), seq![1, 9, 3]);
        assert_eq!(s.with(-1, Value::from(9)).unwrap(), seq![1, 2, 9]);
        assert_eq!(s.with(4, Value::from(4)).unwrap(), seq![1, 2, 3, 4]);
        assert_eq!(
            s.with(6, Value::Nil).unwrap_err(),
            SeqError::OutOfBounds { index: 6, len: 3 }
        );
        assert_eq!(
            s.with(0, Value::Nil).unwrap_err(),
            SeqError::OutOfBounds { index: 0, len: 3 }
        );
        assert_eq!(s, seq![1, 2, 3]);
    }

    #[test]
    fn test_copying_counterparts() {
        let s = seq![3, 1, 2];
        assert_eq!(s.to_reversed(), seq![2, 1, 3]);
        assert_eq!(s.to_sorted(), seq![1, 2, 3]);
        assert_eq!(
            s.to_sorted_by(|a, b| Ok(Value::from(a.natural_cmp(b).is_gt())))
                .unwrap(),
            seq![3, 2, 1]
        );
        assert_eq!(s.to_spliced(2, Some(1), vec![Value::from(7)]), seq![3, 7, 2]);
        assert_eq!(s, seq![3, 1, 2]);
    }

    #[test]
    fn test_join() {
        assert_eq!(seq![1, "a", true, 2.5].join(", ").unwrap(), "1, a, true, 2.5");
        assert_eq!(seq![].join("-").unwrap(), "");
        let err = seq![1, seq![2]].join(",").unwrap_err();
        assert_eq!(err.to_string(), "Type error: cannot join a sequence at index 2");
    }

    #[test]
    fn test_failing_callback_leaves_receiver() {
        let s = seq![1, "a", 3];
        assert!(s.map("x * 2").is_err());
        assert_eq!(s, seq![1, "a", 3]);
    }
}
