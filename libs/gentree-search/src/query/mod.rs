//! Query compiler
//!
//! Translates validated search parameters into a [`FilterExpression`]:
//! 1. Classify every parameter by key shape (names/places, years, sex, ids)
//! 2. Resolve names/places through the allow-list into exact, prefix or
//!    phonetic matches
//! 3. Parse years into inclusive ranges
//! 4. Assemble the filter, applying the tree lookup narrowing and the
//!    deceased-only privacy rule
//!
//! Compilation is pure and fails fast: the first invalid value aborts it.

mod classify;
mod matching;
mod years;

pub use classify::{classify, forces_deceased, ParamKind};
pub use matching::MatchSpec;
pub use years::YearRange;

use crate::filter::{Clause, Condition, FilterExpression};
use crate::params::RawSearchParams;
use crate::phonetic::{PhoneticEncoder, Soundex};
use crate::{Result, SearchError};
use serde_json::Value;
use std::sync::Arc;

/// Search parameter → indexed field. Nothing outside this table is ever
/// queried from user input. `place` has no field of its own and expands
/// over [`PLACE_FIELDS`].
pub const ARGS_TO_INDEX: &[(&str, &str)] = &[
    ("first_name", "name_lc.0"),
    ("last_name", "name_lc.1"),
    ("sex", "sex"),
    ("birth_place", "BIRT_PLAC_lc"),
    ("marriage_place", "MARR_PLAC_lc"),
    ("tree_number", "tree_num"),
    ("death_place", "DEAT_PLAC_lc"),
    ("place", "filler_lc"),
];

pub const PLACE_FIELDS: &[&str] = &["BIRT_PLAC", "MARR_PLAC", "DEAT_PLAC"];

/// Year parameter → stored field. Marriage years are an array per person.
pub const YEAR_FIELDS: &[(&str, &str)] = &[
    ("birth_year", "birth_year"),
    ("death_year", "death_year"),
    ("marriage_year", "marriage_years"),
];

const ARCHIVED_FIELD: &str = "archived";
const DECEASED_FIELD: &str = "deceased";
const INDIVIDUAL_ID_FIELD: &str = "id";

/// Field tables the compiler works from, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub args_to_index: Vec<(String, String)>,
    pub place_fields: Vec<String>,
    pub year_fields: Vec<(String, String)>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let pairs = |table: &[(&str, &str)]| {
            table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        Self {
            args_to_index: pairs(ARGS_TO_INDEX),
            place_fields: PLACE_FIELDS.iter().map(|f| f.to_string()).collect(),
            year_fields: pairs(YEAR_FIELDS),
        }
    }
}

impl CompilerConfig {
    pub fn index_field(&self, param: &str) -> Option<&str> {
        lookup(&self.args_to_index, param)
    }

    pub fn year_field(&self, param: &str) -> Option<&str> {
        lookup(&self.year_fields, param)
    }
}

fn lookup<'a>(table: &'a [(String, String)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// A name/place parameter after field resolution.
struct ResolvedMatch<'a> {
    param: &'a str,
    field: String,
    condition: Condition,
}

#[derive(Clone)]
pub struct QueryCompiler {
    config: Arc<CompilerConfig>,
    encoder: Arc<dyn PhoneticEncoder>,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default(), Arc::new(Soundex))
    }
}

impl std::fmt::Debug for QueryCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCompiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig, encoder: Arc<dyn PhoneticEncoder>) -> Self {
        Self {
            config: Arc::new(config),
            encoder,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile search parameters into a filter.
    pub fn compile(&self, params: &RawSearchParams) -> Result<FilterExpression> {
        let mut names_and_places: Vec<(&str, String)> = Vec::new();
        let mut years: Vec<(&str, &str)> = Vec::new();
        let mut sex: Option<String> = None;
        let mut individual_id: Option<&str> = None;
        let mut only_deceased = false;

        for (key, value) in params.iter() {
            if forces_deceased(key) {
                only_deceased = true;
            }
            match classify(key) {
                ParamKind::NameOrPlace => names_and_places.push((key, value.to_lowercase())),
                ParamKind::Year => years.push((key, value)),
                ParamKind::Sex => {
                    let lowered = value.to_lowercase();
                    if lowered == "m" || lowered == "f" {
                        sex = Some(value.to_uppercase());
                    }
                }
                ParamKind::IndividualId => individual_id = Some(value),
                ParamKind::TreeNumber | ParamKind::Paging | ParamKind::Ignored => {}
            }
        }

        let matches = names_and_places
            .iter()
            .map(|(param, value)| self.resolve_match(param, value))
            .collect::<Result<Vec<_>>>()?;

        let mut ranges = Vec::with_capacity(years.len());
        for (param, value) in years {
            ranges.push((param, YearRange::parse(value)?));
        }

        let mut filter = FilterExpression::new();
        filter.set(ARCHIVED_FIELD, Condition::Missing);

        for (param, range) in ranges {
            if let Some(field) = self.config.year_field(param) {
                filter.set(
                    field,
                    Condition::Range {
                        min: range.min,
                        max: range.max,
                    },
                );
            }
        }

        if let Some(sex) = sex {
            let field = self.indexed("sex")?;
            filter.set(field, Condition::Equals(Value::String(sex)));
        }

        for resolved in matches {
            if resolved.param == "place" {
                filter.set_any_of(self.expand_place(&resolved));
            } else {
                filter.set(resolved.field, resolved.condition);
            }
        }

        if let Some(raw) = params.get("tree_number") {
            let tree_number: i64 = raw
                .trim()
                .parse()
                .map_err(|_| SearchError::invalid_argument("Tree number must be an integer"))?;
            let tree_field = self.indexed("tree_number")?;

            // A tree lookup targets one record in one tree; nothing else applies.
            filter.narrow_to(&[ARCHIVED_FIELD]);
            filter.set(tree_field, Condition::Equals(Value::from(tree_number)));
            if let Some(id) = individual_id {
                filter.set(
                    INDIVIDUAL_ID_FIELD,
                    Condition::Equals(Value::String(id.to_string())),
                );
            }
        }

        if only_deceased {
            filter.set(DECEASED_FIELD, Condition::Equals(Value::Bool(true)));
        }

        Ok(filter)
    }

    fn indexed(&self, param: &str) -> Result<&str> {
        self.config
            .index_field(param)
            .ok_or_else(|| SearchError::UnknownField(param.to_string()))
    }

    fn resolve_match<'a>(&self, param: &'a str, value: &str) -> Result<ResolvedMatch<'a>> {
        let indexed_field = self.indexed(param)?;
        let spec = MatchSpec::parse(param, value, self.encoder.as_ref());
        Ok(ResolvedMatch {
            param,
            field: spec.target_field(indexed_field),
            condition: spec.condition(),
        })
    }

    /// `place` searches every place field, keeping the phonetic or
    /// lower-cased flavour of the resolved field.
    fn expand_place(&self, resolved: &ResolvedMatch<'_>) -> Vec<Clause> {
        let suffix = if resolved.field.ends_with('S') {
            "S"
        } else {
            "_lc"
        };
        self.config
            .place_fields
            .iter()
            .map(|base| Clause::new(format!("{base}{suffix}"), resolved.condition.clone()))
            .collect()
    }
}
