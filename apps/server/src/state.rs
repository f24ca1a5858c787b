//! Shared application state

use std::sync::Arc;

use gentree_search::{PersonCollection, QueryCompiler, RecordSanitizer, SearchExecutor};

use crate::db::{self, PostgresPersonCollection};
use crate::{Config, Error, Result};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search: Arc<SearchExecutor>,
}

impl AppState {
    /// State backed by the Postgres person table from `config.database`.
    pub async fn new(config: Config) -> Result<Self> {
        let pool = db::create_pool(&config.database)?;
        let persons = PostgresPersonCollection::new(pool, config.database.table.clone())?;

        if config.database.create_schema {
            persons.ensure_schema().await?;
        }

        Self::with_collection(config, Arc::new(persons))
    }

    /// State over any person collection, e.g. an in-memory one in tests.
    pub fn with_collection(config: Config, collection: Arc<dyn PersonCollection>) -> Result<Self> {
        let settings = config.search.settings().map_err(Error::Config)?;
        let sanitizer = RecordSanitizer::new(config.search.living_policy());
        let search = SearchExecutor::new(collection, QueryCompiler::default(), sanitizer, settings);

        Ok(Self {
            config: Arc::new(config),
            search: Arc::new(search),
        })
    }
}
