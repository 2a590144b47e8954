//! Folds and side-effecting iteration

use super::{position, Sequence};
use crate::callback::{Callback, Template};
use crate::error::{SeqError, SeqResult};
use crate::value::Value;

impl Sequence {
    /// Left fold with `(acc, cur, i, self)`.
    ///
    /// Without `initial`, the first element is removed from the receiver and
    /// used as the seed; the fold then runs over what is left, with indices
    /// into the shortened sequence. Fails with [`SeqError::EmptyReduce`]
    /// when there is nothing to remove.
    pub fn reduce(&self, callback: impl Into<Callback>, initial: Option<Value>) -> SeqResult<Value> {
        let f = self.callable(callback, Template::Reduce)?;
        let mut acc = match initial {
            Some(seed) => seed,
            None => {
                let seed = self.shift().ok_or(SeqError::EmptyReduce)?;
                tracing::trace!(%seed, "reduce took its seed from the front");
                seed
            }
        };

        for pos in 0..self.len() {
            acc = f.call(&self.reduce_args(acc, pos))?;
        }
        Ok(acc)
    }

    /// Right fold; the seed, when omitted, is removed from the back
    pub fn reduce_right(
        &self,
        callback: impl Into<Callback>,
        initial: Option<Value>,
    ) -> SeqResult<Value> {
        let f = self.callable(callback, Template::Reduce)?;
        let mut acc = match initial {
            Some(seed) => seed,
            None => {
                let seed = self.pop().ok_or(SeqError::EmptyReduce)?;
                tracing::trace!(%seed, "reduce_right took its seed from the back");
                seed
            }
        };

        for pos in (0..self.len()).rev() {
            acc = f.call(&self.reduce_args(acc, pos))?;
        }
        Ok(acc)
    }

    /// Run a side-effect callback `(x, i, self)` for every element
    pub fn for_each(&self, callback: impl Into<Callback>) -> SeqResult<()> {
        let f = self.callable(callback, Template::SideEffect)?;
        for pos in 0..self.len() {
            f.call(&self.element_args(pos))?;
        }
        Ok(())
    }

    fn reduce_args(&self, acc: Value, pos: usize) -> [Value; 4] {
        [
            acc,
            self.element(pos).unwrap_or_default(),
            position(pos),
            Value::Sequence(self.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::callback::Callback;
    use crate::error::SeqError;
    use crate::seq;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_reduce_without_seed_consumes_first() {
        let s = seq![1, 2, 3];
        assert_eq!(s.reduce("acc + cur", None).unwrap(), Value::from(6));
        assert_eq!(s, seq![2, 3]);
    }

    #[test]
    fn test_reduce_with_seed_keeps_receiver() {
        let s = seq![1, 2, 3];
        assert_eq!(
            s.reduce("acc .. cur", Some(Value::from(""))).unwrap(),
            Value::from("123")
        );
        assert_eq!(s, seq![1, 2, 3]);
    }

    #[test]
    fn test_reduce_indices_follow_shortened_sequence() {
        let s = seq![10, 20, 30];
        // seed 10 removed; 20 is now at 1 and 30 at 2
        assert_eq!(s.reduce("acc + i", None).unwrap(), Value::from(13));
    }

    #[test]
    fn test_reduce_right() {
        let s = seq!["a", "b", "c"];
        assert_eq!(s.reduce_right("acc .. cur", None).unwrap(), Value::from("cba"));
        assert_eq!(s, seq!["a", "b"]);
    }

    #[test]
    fn test_empty_reduce() {
        assert_eq!(
            seq![].reduce("acc + cur", None).unwrap_err(),
            SeqError::EmptyReduce
        );
        assert_eq!(
            seq![].reduce_right("acc + cur", None).unwrap_err(),
            SeqError::EmptyReduce
        );
        assert_eq!(
            seq![].reduce("acc + cur", Some(Value::from(7))).unwrap(),
            Value::from(7)
        );
    }

    #[test]
    fn test_compile_error_does_not_consume_seed() {
        let s = seq![1, 2];
        assert!(s.reduce("acc +", None).is_err());
        assert_eq!(s, seq![1, 2]);
    }

    #[test]
    fn test_for_each_visits_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        seq!["a", "b"]
            .for_each(Callback::native(move |args| {
                sink.borrow_mut().push(format!("{}{}", args[0], args[1]));
                Ok(Value::Nil)
            }))
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["a1", "b2"]);
    }

    #[test]
    fn test_for_each_text_surfaces_errors() {
        assert!(seq![1].for_each("").is_ok());
        assert!(matches!(
            seq![1].for_each("x; x / 0"),
            Err(SeqError::DivideByZero { .. })
        ));
    }
}
