//! Structured filter expression produced by the query compiler.
//!
//! A filter is an ordered set of field clauses joined by AND, plus at most
//! one disjunction. Setting a field that already has a clause replaces it in
//! place (last write wins, first position kept).

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field must be absent from the document.
    Missing,
    /// Scalar equality, or membership when the stored field is an array.
    Equals(Value),
    /// Inclusive numeric range; on an array field any element may match.
    Range { min: i64, max: i64 },
    /// Case-sensitive prefix match on a string (or any string element).
    Prefix(String),
}

impl Condition {
    /// Anchored regular expression equivalent to a `Prefix` condition.
    pub fn prefix_pattern(prefix: &str) -> String {
        format!("^{}", regex::escape(prefix))
    }

    /// Evaluate the condition against the value stored at the clause's field.
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        match self {
            Condition::Missing => actual.is_none(),
            Condition::Equals(expected) => actual
                .map(|value| any_element(value, |v| values_equal(v, expected)))
                .unwrap_or(false),
            Condition::Range { min, max } => actual
                .map(|value| {
                    any_element(value, |v| number_in_range(v, *min, *max))
                })
                .unwrap_or(false),
            Condition::Prefix(prefix) => actual
                .map(|value| {
                    any_element(value, |v| {
                        v.as_str().map(|s| s.starts_with(prefix)).unwrap_or(false)
                    })
                })
                .unwrap_or(false),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Condition::Missing => serde_json::json!({ "$exists": false }),
            Condition::Equals(value) => value.clone(),
            Condition::Range { min, max } => serde_json::json!({ "$gte": min, "$lte": max }),
            Condition::Prefix(prefix) => {
                serde_json::json!({ "$regex": Condition::prefix_pattern(prefix) })
            }
        }
    }
}

/// One `field <condition>` term.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub condition: Condition,
}

impl Clause {
    pub fn new(field: impl Into<String>, condition: Condition) -> Self {
        Self {
            field: field.into(),
            condition,
        }
    }

    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        self.condition.matches(resolve_path(document, &self.field))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    clauses: Vec<Clause>,
    any_of: Option<Vec<Clause>>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clause for `field`, replacing any earlier clause for it.
    pub fn set(&mut self, field: impl Into<String>, condition: Condition) {
        let field = field.into();
        if let Some(existing) = self.clauses.iter_mut().find(|c| c.field == field) {
            existing.condition = condition;
        } else {
            self.clauses.push(Clause { field, condition });
        }
    }

    /// Set the disjunction, replacing any earlier one.
    pub fn set_any_of(&mut self, alternatives: Vec<Clause>) {
        self.any_of = Some(alternatives);
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.clauses
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.condition)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn any_of(&self) -> Option<&[Clause]> {
        self.any_of.as_deref()
    }

    /// Drop every clause whose field is not in `keep`, and the disjunction.
    pub fn narrow_to(&mut self, keep: &[&str]) {
        self.clauses.retain(|c| keep.contains(&c.field.as_str()));
        self.any_of = None;
    }

    /// Fields referenced anywhere in the filter, disjunction included.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.clauses
            .iter()
            .chain(self.any_of.iter().flatten())
            .map(|c| c.field.as_str())
    }

    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|c| c.matches(document))
            && self
                .any_of
                .as_ref()
                .map(|alternatives| alternatives.iter().any(|c| c.matches(document)))
                .unwrap_or(true)
    }

    /// Document-store style rendering, used for logs and debugging.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for clause in &self.clauses {
            out.insert(clause.field.clone(), clause.condition.to_json());
        }
        if let Some(alternatives) = &self.any_of {
            let rendered = alternatives
                .iter()
                .map(|c| {
                    let mut single = Map::new();
                    single.insert(c.field.clone(), c.condition.to_json());
                    Value::Object(single)
                })
                .collect();
            out.insert("$or".to_string(), Value::Array(rendered));
        }
        Value::Object(out)
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Resolve a dotted path. Numeric segments index into arrays.
pub fn resolve_path<'a>(document: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn any_element(value: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(&predicate) || predicate(value),
        other => predicate(other),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
        },
        _ => left == right,
    }
}

// Integers compare exactly; only fractional numbers go through f64.
fn number_in_range(value: &Value, min: i64, max: i64) -> bool {
    let Value::Number(n) = value else {
        return false;
    };
    if let Some(n) = n.as_i64() {
        return n >= min && n <= max;
    }
    if n.as_u64().is_some() {
        // Above i64::MAX, so above any max.
        return false;
    }
    n.as_f64()
        .map(|n| n >= min as f64 && n <= max as f64)
        .unwrap_or(false)
}
