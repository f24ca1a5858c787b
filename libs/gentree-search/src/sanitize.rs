//! Result sanitizer
//!
//! Turns a stored person document into its public shape: drops the store's
//! internal identity, renames legacy GEDCOM-style keys and strips everything
//! but a small whitelist from persons presumed alive. Missing fields are
//! never an error.

use crate::collection::PersonRecord;
use crate::living::{LivingPersonPolicy, LIVING_PERSON_WHITELISTED_KEYS};
use chrono::Datelike;
use serde_json::Value;

/// Store-internal document identity.
pub const INTERNAL_ID_FIELD: &str = "_id";

/// Legacy storage key → public API key.
pub const FIELD_RENAMES: &[(&str, &str)] = &[
    ("BIRT_PLAC", "birth_place"),
    ("DEAT_PLAC", "death_place"),
    ("MARR_PLAC", "marriage_place"),
    ("MARR_DATE", "marriage_date"),
    ("OCCU", "occupation"),
    ("NOTE", "bio"),
];

#[derive(Debug, Clone, Default)]
pub struct RecordSanitizer {
    policy: LivingPersonPolicy,
    current_year: Option<i64>,
}

impl RecordSanitizer {
    pub fn new(policy: LivingPersonPolicy) -> Self {
        Self {
            policy,
            current_year: None,
        }
    }

    /// Pin the year used for age checks instead of reading the clock.
    pub fn with_current_year(mut self, year: i64) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn policy(&self) -> &LivingPersonPolicy {
        &self.policy
    }

    pub fn sanitize(&self, mut person: PersonRecord) -> PersonRecord {
        person.remove(INTERNAL_ID_FIELD);

        for (legacy, public) in FIELD_RENAMES {
            if let Some(value) = person.remove(*legacy) {
                person.insert(public.to_string(), value);
            }
        }

        let deceased = person.get("deceased").and_then(Value::as_bool);
        let birth_year = person.get("birth_year").and_then(year_of);
        if self.policy.is_living(deceased, birth_year, self.current_year()) {
            person.retain(|key, _| LIVING_PERSON_WHITELISTED_KEYS.contains(&key.as_str()));
        }

        person
    }

    fn current_year(&self) -> i64 {
        self.current_year
            .unwrap_or_else(|| i64::from(chrono::Utc::now().year()))
    }
}

/// Birth years are stored as numbers, but older imports carry strings.
fn year_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
