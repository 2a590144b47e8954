//! Property tests for the sequence contract

mod common;

use common::*;
use proptest::prelude::*;
use seqkit_runtime::{is_sequence, Callback, SeqError, Sequence, Table, Value};

fn small_numbers() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-50i32..50).prop_map(f64::from), 0..24)
}

proptest! {
    #[test]
    fn from_values_is_independent(values in small_numbers()) {
        let source = nums(&values);
        let copy = Sequence::from_values(&source.to_vec());
        prop_assert_eq!(&copy, &source);

        copy.push([Value::from(1000)]);
        copy.reverse();
        prop_assert_eq!(numbers_of(&source), values);
    }

    #[test]
    fn map_then_flat_equals_flat_map(values in small_numbers()) {
        let s = nums(&values);
        let pair = |args: &[Value]| -> Result<Value, SeqError> {
            let x = args[0].clone();
            if x.as_number().unwrap_or(0.0) >= 0.0 {
                Ok(Value::from(Sequence::new(vec![x.clone(), x])))
            } else {
                Ok(x)
            }
        };
        let mapped = s.map(Callback::native(pair)).unwrap().flat(Some(1));
        let flat_mapped = s.flat_map(Callback::native(pair)).unwrap();
        prop_assert_eq!(mapped, flat_mapped);
    }

    #[test]
    fn textual_map_then_flat_equals_flat_map(values in small_numbers()) {
        let s = nums(&values);
        prop_assert_eq!(
            s.map("x * i").unwrap().flat(Some(1)),
            s.flat_map("x * i").unwrap()
        );
    }

    #[test]
    fn sort_equals_to_sorted(values in small_numbers()) {
        let s = nums(&values);
        let sorted = s.to_sorted();
        prop_assert_eq!(numbers_of(&s), values.clone());

        s.sort();
        prop_assert_eq!(&s, &sorted);
    }

    #[test]
    fn sort_by_equals_to_sorted_by(values in small_numbers()) {
        let s = nums(&values);
        let desc = |a: &Value, b: &Value| -> Result<Value, SeqError> {
            Ok(Value::from(b.natural_cmp(a).is_lt()))
        };
        let sorted = s.to_sorted_by(desc).unwrap();
        s.sort_by(desc).unwrap();
        prop_assert_eq!(&s, &sorted);

        let expected = {
            let mut v = values.clone();
            v.sort_by(|a, b| b.total_cmp(a));
            v
        };
        prop_assert_eq!(numbers_of(&s), expected);
    }

    #[test]
    fn seeded_reduce_of_empty_returns_seed(seed in -100i32..100) {
        let s = nums(&[]);
        prop_assert_eq!(s.reduce("acc + cur", Some(Value::from(seed))).unwrap(), Value::from(seed));
        prop_assert_eq!(s.reduce_right("acc + cur", Some(Value::from(seed))).unwrap(), Value::from(seed));
        prop_assert_eq!(s.reduce("acc + cur", None).unwrap_err(), SeqError::EmptyReduce);
    }

    #[test]
    fn seedless_reduce_matches_seeded_sum(values in prop::collection::vec(-50i32..50, 1..24)) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let expected: f64 = values.iter().sum();

        let seeded = nums(&values).reduce("acc + cur", Some(Value::from(0))).unwrap();
        let seedless = nums(&values).reduce("acc + cur", None).unwrap();
        prop_assert_eq!(seeded, Value::from(expected));
        prop_assert_eq!(seedless, Value::from(expected));
    }

    #[test]
    fn splice_with_zero_delete_inserts(
        values in small_numbers(),
        items in small_numbers(),
        start_seed in 0usize..32,
    ) {
        let s = nums(&values);
        let start = (start_seed % (values.len() + 1)) + 1;
        let inserted: Vec<Value> = items.iter().copied().map(Value::from).collect();
        s.splice(start as i64, Some(0), inserted);

        prop_assert_eq!(s.len(), values.len() + items.len());
        let mut expected = values.clone();
        expected.splice(start - 1..start - 1, items.iter().copied());
        prop_assert_eq!(numbers_of(&s), expected);
    }

    #[test]
    fn contiguous_tables_are_sequences(len in 0usize..32) {
        let table = Table::list((0..len).map(Value::from));
        prop_assert!(is_sequence(&Value::from(table)));
    }

    #[test]
    fn tables_with_a_gap_are_not_sequences(len in 2usize..32, hole_seed in 0usize..32) {
        let hole = hole_seed % (len - 1);
        let values: Vec<Option<f64>> = (0..len)
            .map(|i| if i == hole { None } else { Some(i as f64) })
            .collect();
        prop_assert!(!is_sequence(&Value::from(holes(&values))));
    }
}
