//! JSON interop
//!
//! Arrays become sequences and objects become tables. Object keys that look
//! like integers become numeric keys, so `{"1": "a", "2": "b"}` passes the
//! structural list test. On the way out, non-empty list-shaped tables are
//! written as arrays; other tables are written as objects with their keys in
//! textual form.

use crate::error::{SeqError, SeqResult};
use crate::sequence::Sequence;
use crate::table::{Key, Table};
use crate::value::Value;
use std::collections::HashSet;

impl Value {
    /// Convert a parsed JSON document
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            // JSON numbers are always doubles here
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Sequence::new(items.iter().map(Value::from_json).collect()))
            }
            serde_json::Value::Object(map) => Value::Table(Table::from_pairs(
                map.iter().map(|(k, v)| (object_key(k), Value::from_json(v))),
            )),
        }
    }

    /// Parse JSON text
    pub fn parse_json(text: &str) -> SeqResult<Value> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from_json(&json))
    }

    /// Convert to a JSON document. Fails on NaN or infinite numbers and on
    /// self-referencing structures.
    pub fn to_json(&self) -> SeqResult<serde_json::Value> {
        to_json_value(self, &mut HashSet::new())
    }

    /// Serialize to compact JSON text
    pub fn to_json_string(&self) -> SeqResult<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

fn object_key(key: &str) -> Key {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => Key::int(i),
        _ => Key::from(key),
    }
}

fn to_json_value(value: &Value, visited: &mut HashSet<usize>) -> SeqResult<serde_json::Value> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => Ok(serde_json::Value::String(s.to_string())),
        Value::Sequence(seq) => {
            let id = seq.storage_id();
            if !visited.insert(id) {
                return Err(circular());
            }
            let items = seq
                .to_vec()
                .iter()
                .map(|v| to_json_value(v, visited))
                .collect::<SeqResult<Vec<_>>>();
            visited.remove(&id);
            Ok(serde_json::Value::Array(items?))
        }
        Value::Table(table) => {
            let id = table.storage_id();
            if !visited.insert(id) {
                return Err(circular());
            }
            let result = table_to_json(table, visited);
            visited.remove(&id);
            result
        }
    }
}

fn table_to_json(table: &Table, visited: &mut HashSet<usize>) -> SeqResult<serde_json::Value> {
    if !table.is_empty() && table.is_list() {
        let items = table
            .list_values()
            .iter()
            .map(|v| to_json_value(v, visited))
            .collect::<SeqResult<Vec<_>>>()?;
        return Ok(serde_json::Value::Array(items));
    }

    let mut map = serde_json::Map::new();
    for (key, value) in table.entries() {
        let name = match &key {
            Key::String(s) => s.to_string(),
            other => other.to_value().to_string(),
        };
        map.insert(name, to_json_value(&value, visited)?);
    }
    Ok(serde_json::Value::Object(map))
}

fn number_to_json(n: f64) -> SeqResult<serde_json::Value> {
    if !n.is_finite() {
        return Err(SeqError::Json {
            msg: "cannot serialize NaN or infinity".to_string(),
        });
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return Ok(serde_json::Value::from(n as i64));
    }
    Ok(serde_json::Value::from(n))
}

fn circular() -> SeqError {
    SeqError::Json {
        msg: "circular reference detected".to_string(),
    }
}
