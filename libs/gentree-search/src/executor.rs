//! Search executor
//!
//! Compiles the request, counts matches (bounded or not), fetches one
//! projected page and sanitizes each record as the caller pulls it.
//!
//! No sort is applied: pages follow the collection's natural order, so
//! paging is only stable if that order is. An unbounded count scans every
//! match and cannot be interrupted from here.

use crate::collection::{CountLimit, FindOptions, PersonCollection, PersonRecord, RecordStream};
use crate::filter::FilterExpression;
use crate::params::{build_search_dict, RawSearchParams};
use crate::query::QueryCompiler;
use crate::sanitize::RecordSanitizer;
use crate::{Result, SearchError};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;

/// Fields returned by a search, before sanitization.
pub const PROJECTION: &[&str] = &[
    "id",
    "name",
    "parents",
    "partners",
    "siblings",
    "tree_num",
    "sex",
    "tree_version",
    "Slug",
    "birth_year",
    "death_year",
    "BIRT_PLAC",
    "DEAT_PLAC",
    "deceased",
    "marriage_years",
];

pub const DEFAULT_MAX_RESULTS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Page size when the request does not give `max_results`.
    pub default_max_results: u64,
    /// Count limit when the request does not give `max_count_results`.
    pub default_max_count_results: CountLimit,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_max_results: DEFAULT_MAX_RESULTS,
            default_max_count_results: CountLimit::Unbounded,
        }
    }
}

/// Paging controls of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub start: u64,
    pub max_results: u64,
    pub max_count_results: CountLimit,
}

impl SearchRequest {
    pub fn from_params(params: &RawSearchParams, settings: &SearchSettings) -> Result<Self> {
        let start = match params.get("start") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                SearchError::invalid_argument("start must be a non-negative integer")
            })?,
            None => 0,
        };

        let max_results = match params.get("max_results") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(SearchError::invalid_argument(
                        "max_results must be a positive integer",
                    ))
                }
            },
            None => settings.default_max_results,
        };

        let max_count_results = match params.get("max_count_results") {
            Some(raw) => parse_count_limit(raw)?,
            None => settings.default_max_count_results,
        };

        Ok(Self {
            start,
            max_results,
            max_count_results,
        })
    }
}

/// `-1` (and `0`) mean "count everything".
pub fn parse_count_limit(raw: &str) -> Result<CountLimit> {
    match raw.trim().parse::<i64>() {
        Ok(-1) | Ok(0) => Ok(CountLimit::Unbounded),
        Ok(n) if n > 0 => Ok(CountLimit::AtMost(n as u64)),
        _ => Err(SearchError::invalid_argument(
            "max_count_results must be -1 or a positive integer",
        )),
    }
}

/// Total match count and the sanitized page.
pub struct SearchOutcome {
    pub total: u64,
    pub records: RecordStream,
}

impl SearchOutcome {
    /// Drain the page into memory.
    pub async fn collect(self) -> Result<(u64, Vec<PersonRecord>)> {
        let records: Vec<PersonRecord> = self.records.try_collect().await?;
        Ok((self.total, records))
    }
}

impl std::fmt::Debug for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOutcome")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct SearchExecutor {
    collection: Arc<dyn PersonCollection>,
    compiler: QueryCompiler,
    sanitizer: RecordSanitizer,
    settings: SearchSettings,
}

impl SearchExecutor {
    pub fn new(
        collection: Arc<dyn PersonCollection>,
        compiler: QueryCompiler,
        sanitizer: RecordSanitizer,
        settings: SearchSettings,
    ) -> Self {
        Self {
            collection,
            compiler,
            sanitizer,
            settings,
        }
    }

    /// Executor with the default compiler, sanitizer and settings.
    pub fn with_defaults(collection: Arc<dyn PersonCollection>) -> Self {
        Self::new(
            collection,
            QueryCompiler::default(),
            RecordSanitizer::default(),
            SearchSettings::default(),
        )
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Search from raw `(key, value)` items as decoded from a query string.
    pub async fn search_items<K, V>(&self, items: &[(K, V)]) -> Result<SearchOutcome>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = build_search_dict(items)?;
        self.search(&params).await
    }

    pub async fn search(&self, params: &RawSearchParams) -> Result<SearchOutcome> {
        let request = SearchRequest::from_params(params, &self.settings)?;
        let filter = self.compiler.compile(params)?;
        self.execute(&filter, &request).await
    }

    #[tracing::instrument(
        name = "person_search",
        skip_all,
        fields(
            start = request.start,
            max_results = request.max_results,
            total = tracing::field::Empty,
        )
    )]
    pub async fn execute(
        &self,
        filter: &FilterExpression,
        request: &SearchRequest,
    ) -> Result<SearchOutcome> {
        let total = self
            .collection
            .count(filter, request.max_count_results)
            .await?;
        tracing::Span::current().record("total", total);

        let options = FindOptions {
            projection: Some(PROJECTION.iter().map(|f| f.to_string()).collect()),
            skip: request.start,
            limit: Some(request.max_results),
        };
        let raw = self.collection.find(filter, options).await?;

        tracing::debug!(filter = %filter, total, "Person search query executed");

        let sanitizer = self.sanitizer.clone();
        let records = raw.map_ok(move |record| sanitizer.sanitize(record)).boxed();

        Ok(SearchOutcome { total, records })
    }
}
