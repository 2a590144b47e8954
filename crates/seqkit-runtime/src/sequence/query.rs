//! Query and predicate methods. None of these mutate the receiver.

use super::{resolve_index, Sequence};
use crate::callback::{Callback, Template};
use crate::error::SeqResult;
use crate::value::Value;

impl Sequence {
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Element at 1-based `index`
    pub fn get(&self, index: i64) -> Option<Value> {
        if index < 1 {
            return None;
        }
        self.element((index - 1) as usize)
    }

    /// Shallow snapshot of the elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.storage.borrow().clone()
    }

    /// Element at `index`, where negative indices count from the end
    pub fn at(&self, index: i64) -> Option<Value> {
        self.get(resolve_index(index, self.len()))
    }

    pub fn includes(&self, value: &Value, from: Option<i64>) -> bool {
        self.index_of(value, from) != -1
    }

    /// First 1-based index holding `value` at or after `from`, or `-1`
    pub fn index_of(&self, value: &Value, from: Option<i64>) -> i64 {
        let items = self.storage.borrow();
        let start = resolve_index(from.unwrap_or(1), items.len()).max(1) as usize;
        items
            .iter()
            .enumerate()
            .skip(start - 1)
            .find(|(_, item)| *item == value)
            .map_or(-1, |(pos, _)| pos as i64 + 1)
    }

    /// Last 1-based index holding `value` at or before `from`, or `-1`
    pub fn last_index_of(&self, value: &Value, from: Option<i64>) -> i64 {
        let items = self.storage.borrow();
        let len = items.len();
        let start = resolve_index(from.unwrap_or(len as i64), len).min(len as i64);
        if start < 1 {
            return -1;
        }
        items[..start as usize]
            .iter()
            .rposition(|item| item == value)
            .map_or(-1, |pos| pos as i64 + 1)
    }

    /// First element passing the element test
    pub fn find(&self, callback: impl Into<Callback>) -> SeqResult<Option<Value>> {
        Ok(self.find_position(callback, false)?.map(|(_, x)| x))
    }

    /// 1-based index of the first element passing the element test, or `-1`
    pub fn find_index(&self, callback: impl Into<Callback>) -> SeqResult<i64> {
        Ok(self
            .find_position(callback, false)?
            .map_or(-1, |(pos, _)| pos as i64 + 1))
    }

    /// Last element passing the element test
    pub fn find_last(&self, callback: impl Into<Callback>) -> SeqResult<Option<Value>> {
        Ok(self.find_position(callback, true)?.map(|(_, x)| x))
    }

    /// 1-based index of the last element passing the element test, or `-1`
    pub fn find_last_index(&self, callback: impl Into<Callback>) -> SeqResult<i64> {
        Ok(self
            .find_position(callback, true)?
            .map_or(-1, |(pos, _)| pos as i64 + 1))
    }

    /// `false` at the first failing element; `true` when empty
    pub fn every(&self, callback: impl Into<Callback>) -> SeqResult<bool> {
        let test = self.callable(callback, Template::ElementTest)?;
        for pos in 0..self.len() {
            if !test.call(&self.element_args(pos))?.is_truthy() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` at the first passing element; `false` when empty
    pub fn some(&self, callback: impl Into<Callback>) -> SeqResult<bool> {
        Ok(self.find_position(callback, false)?.is_some())
    }

    /// 0-based position of the first (or last) element passing the test.
    ///
    /// The length is read once up front; elements are read live.
    fn find_position(
        &self,
        callback: impl Into<Callback>,
        backward: bool,
    ) -> SeqResult<Option<(usize, Value)>> {
        let test = self.callable(callback, Template::ElementTest)?;
        let len = self.len();
        let positions: Box<dyn Iterator<Item = usize>> = if backward {
            Box::new((0..len).rev())
        } else {
            Box::new(0..len)
        };

        // hand back the element that was tested, even if the callback
        // has since rewritten its slot
        for pos in positions {
            let args = self.element_args(pos);
            if test.call(&args)?.is_truthy() {
                let [x, _, _] = args;
                return Ok(Some((pos, x)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::callback::Callback;
    use crate::error::SeqError;
    use crate::seq;
    use crate::value::Value;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_get_and_at() {
        let s = seq!["a", "b", "c"];
        assert_eq!(s.get(1), Some(Value::from("a")));
        assert_eq!(s.get(0), None);
        assert_eq!(s.get(4), None);
        assert_eq!(s.at(-1), Some(Value::from("c")));
        assert_eq!(s.at(-3), Some(Value::from("a")));
        assert_eq!(s.at(-4), None);
    }

    #[test]
    fn test_index_of_family() {
        let s = seq![1, 2, 1, 3];
        assert_eq!(s.index_of(&Value::from(1), None), 1);
        assert_eq!(s.index_of(&Value::from(1), Some(2)), 3);
        assert_eq!(s.index_of(&Value::from(9), None), -1);
        assert_eq!(s.last_index_of(&Value::from(1), None), 3);
        assert_eq!(s.last_index_of(&Value::from(1), Some(2)), 1);
        assert_eq!(s.last_index_of(&Value::from(3), Some(0)), -1);
        assert!(s.includes(&Value::from(3), None));
        assert!(!s.includes(&Value::from(2), Some(3)));
    }

    #[test]
    fn test_index_of_compares_nested_by_content() {
        let s = seq![1, seq![2, 3]];
        assert_eq!(s.index_of(&Value::from(seq![2, 3]), None), 2);
    }

    #[test]
    fn test_find_family() {
        let s = seq![1, 4, 6, 7];
        assert_eq!(s.find("x % 2 == 0").unwrap(), Some(Value::from(4)));
        assert_eq!(s.find_index("x % 2 == 0").unwrap(), 2);
        assert_eq!(s.find_last("x % 2 == 0").unwrap(), Some(Value::from(6)));
        assert_eq!(s.find_last_index("x % 2 == 0").unwrap(), 3);
        assert_eq!(s.find("x > 10").unwrap(), None);
        assert_eq!(s.find_last_index("x > 10").unwrap(), -1);
    }

    #[test]
    fn test_every_and_some_short_circuit() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let s = seq![1, 2, 3];
        let found = s
            .some(Callback::native(move |args| {
                counter.set(counter.get() + 1);
                Ok(Value::from(args[0] == Value::from(2)))
            }))
            .unwrap();
        assert!(found);
        assert_eq!(calls.get(), 2);

        assert!(!s.every("x < 2").unwrap());
        assert!(seq![].every("false").unwrap());
        assert!(!seq![].some("true").unwrap());
    }

    #[test]
    fn test_callback_receives_index_and_self() {
        let s = seq![10, 20];
        assert_eq!(s.find_index("self[i] == x and i == 2").unwrap(), 2);
    }

    #[test]
    fn test_callback_may_mutate_receiver() {
        let s = seq![1, 2, 3];
        let alias = s.clone();
        let found = s
            .find(Callback::native(move |_| {
                alias.pop();
                Ok(Value::from(false))
            }))
            .unwrap();
        assert_eq!(found, None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_find_returns_the_tested_element() {
        let s = seq![1, 2, 3];
        let alias = s.clone();
        let found = s
            .find(Callback::native(move |args| {
                alias.fill(Value::from("gone"), None, None);
                Ok(Value::from(args[0] == Value::from(1)))
            }))
            .unwrap();
        assert_eq!(found, Some(Value::from(1)));
        assert_eq!(s, seq!["gone", "gone", "gone"]);

        let s = seq![1, 2, 3];
        let alias = s.clone();
        let found = s
            .find_last(Callback::native(move |_| {
                alias.pop();
                Ok(Value::from(true))
            }))
            .unwrap();
        assert_eq!(found, Some(Value::from(3)));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_compile_error_surfaces_at_call() {
        let err = seq![1].find("x +").unwrap_err();
        assert!(matches!(err, SeqError::Compile { .. }));
    }
}
