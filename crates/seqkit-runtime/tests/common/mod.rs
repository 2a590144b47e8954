//! Shared helpers for seqkit integration tests

#![allow(dead_code)]

use seqkit_runtime::{SeqError, Sequence, Table, Value};

pub use pretty_assertions::{assert_eq, assert_ne};

/// Sequence of numbers
pub fn nums(values: &[f64]) -> Sequence {
    Sequence::of(values.iter().copied())
}

/// Untyped table from positional values; `None` leaves a hole
pub fn holes(values: &[Option<f64>]) -> Table {
    Table::list(values.iter().map(|v| Value::from(*v)))
}

/// Numbers held by a sequence, panicking on anything else
pub fn numbers_of(seq: &Sequence) -> Vec<f64> {
    seq.to_vec()
        .iter()
        .map(|v| match v {
            Value::Number(n) => *n,
            other => panic!("Expected a number, got {:?}", other),
        })
        .collect()
}

/// Assert that a sequence holds exactly these numbers
pub fn assert_numbers(seq: &Sequence, expected: &[f64]) {
    assert_eq!(numbers_of(seq), expected.to_vec());
}

/// Assert that an operation failed to compile its callback
pub fn assert_compile_error<T: std::fmt::Debug>(result: Result<T, SeqError>, fragment: &str) {
    match result {
        Err(err @ SeqError::Compile { .. }) => assert!(
            err.to_string().contains(fragment),
            "Expected compile error containing {:?}, got {:?}",
            fragment,
            err.to_string()
        ),
        other => panic!("Expected compile error, got {:?}", other),
    }
}
