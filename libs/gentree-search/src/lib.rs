//! Genealogy person search core
//!
//! Turns loosely typed search parameters into a structured filter, runs it
//! against a person collection and redacts what comes back:
//! - Input validation (`params`)
//! - Query compilation with exact/prefix/phonetic name matching and
//!   fudge-factor year ranges (`query`, `filter`)
//! - Paged execution with bounded or unbounded totals (`executor`)
//! - Legacy field renaming and living-person redaction (`sanitize`)

#![forbid(unsafe_code)]

pub mod collection;
mod error;
pub mod executor;
pub mod filter;
pub mod living;
pub mod params;
pub mod phonetic;
pub mod query;
pub mod sanitize;

pub use collection::{
    CountLimit, FindOptions, MemoryCollection, PersonCollection, PersonRecord, RecordStream,
};
pub use error::{Result, SearchError};
pub use executor::{SearchExecutor, SearchOutcome, SearchRequest, SearchSettings, PROJECTION};
pub use filter::{Condition, FilterExpression};
pub use living::{LivingPersonPolicy, LIVING_PERSON_WHITELISTED_KEYS};
pub use params::{build_search_dict, RawSearchParams};
pub use phonetic::{PhoneticEncoder, Soundex};
pub use query::{CompilerConfig, MatchSpec, QueryCompiler, YearRange};
pub use sanitize::RecordSanitizer;
