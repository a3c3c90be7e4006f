use crate::Error;
use crate::MAX_JSON_DEPTH;
use crate::term::{Term, church};

/// Parse a JSON document into a term
pub fn parse_json(input: &str) -> Result<Term, Error> {
    let json_value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| Error::ConversionError(format!("Invalid JSON: {e}")))?;

    Term::from_json(json_value)
}

impl Term {
    /// Convert host JSON data into a term.
    ///
    /// Integers that fit in 32 bits become `I32`, every other number `F64`.
    /// Booleans become Church booleans. `null` has no term counterpart and is
    /// rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Term, Error> {
        json_to_term(json, 0)
    }

    /// Convert a term back into JSON data.
    ///
    /// Only value variants and Church booleans have a JSON form.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        if let Some(b) = self.as_church() {
            return Ok(serde_json::Value::Bool(b));
        }
        match self {
            Term::I32(n) => Ok(serde_json::Value::from(*n)),
            Term::F64(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| Error::ConversionError(format!("{n} has no JSON form"))),
            Term::Str(s) => Ok(serde_json::Value::String(s.clone())),
            Term::List(items) => {
                let converted: Result<Vec<serde_json::Value>, Error> =
                    items.iter().map(Term::to_json).collect();
                Ok(serde_json::Value::Array(converted?))
            }
            Term::Table(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json()?);
                }
                Ok(serde_json::Value::Object(map))
            }
            other => Err(Error::ConversionError(format!(
                "{other:?} is not a data term"
            ))),
        }
    }
}

fn json_to_term(json: serde_json::Value, depth: usize) -> Result<Term, Error> {
    if depth >= MAX_JSON_DEPTH {
        return Err(Error::ConversionError(format!(
            "JSON document too deeply nested (max depth: {MAX_JSON_DEPTH})"
        )));
    }
    match json {
        serde_json::Value::Null => Err(Error::ConversionError(
            "null values have no term representation".into(),
        )),
        serde_json::Value::Bool(b) => Ok(church(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64()
                && let Ok(small) = i32::try_from(i)
            {
                Ok(Term::I32(small))
            } else if let Some(f) = n.as_f64() {
                Ok(Term::F64(f))
            } else {
                Err(Error::ConversionError(format!(
                    "Number out of range: {n}"
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Term::Str(s)),
        serde_json::Value::Array(arr) => {
            let items: Result<Vec<Term>, Error> = arr
                .into_iter()
                .map(|v| json_to_term(v, depth + 1))
                .collect();
            Ok(Term::List(items?))
        }
        serde_json::Value::Object(obj) => {
            let mut entries = std::collections::BTreeMap::new();
            for (k, v) in obj {
                entries.insert(k, json_to_term(v, depth + 1)?);
            }
            Ok(Term::Table(entries))
        }
    }
}
