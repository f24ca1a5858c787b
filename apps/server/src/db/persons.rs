//! Postgres-backed person collection.

use async_stream::stream;
use async_trait::async_trait;
use futures::TryStreamExt;
use gentree_search::{
    CountLimit, FilterExpression, FindOptions, PersonCollection, PersonRecord, RecordStream,
    SearchError,
};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgArguments, query::QueryScalar, PgPool, Postgres};

use super::query_builder::{BindValue, PersonQuery};
use super::sql::{quote_identifier, validate_identifier};

/// Persons stored one JSONB document per row of `table`.
#[derive(Debug, Clone)]
pub struct PostgresPersonCollection {
    pool: PgPool,
    table: String,
}

impl PostgresPersonCollection {
    pub fn new(pool: PgPool, table: impl Into<String>) -> crate::Result<Self> {
        let table = table.into();
        validate_identifier(&table).map_err(crate::Error::Config)?;
        Ok(Self { pool, table })
    }

    /// Create the table and its containment index if they do not exist.
    pub async fn ensure_schema(&self) -> crate::Result<()> {
        let table = quote_identifier(&self.table);
        let index = quote_identifier(&format!("{}_document_idx", self.table));

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
             seq BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY, \
             document JSONB NOT NULL)"
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {index} ON {table} USING GIN (document jsonb_path_ops)"
        ))
        .execute(&self.pool)
        .await?;

        tracing::info!(table = %self.table, "Person table ready");
        Ok(())
    }

    /// Append one person document.
    pub async fn insert(&self, document: &JsonValue) -> crate::Result<()> {
        let table = quote_identifier(&self.table);
        sqlx::query(&format!("INSERT INTO {table} (document) VALUES ($1)"))
            .bind(document)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn bind_all<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    bind_values: Vec<BindValue>,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in bind_values {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::TextArray(vs) => query.bind(vs),
            BindValue::Json(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
        };
    }
    query
}

#[async_trait]
impl PersonCollection for PostgresPersonCollection {
    async fn count(
        &self,
        filter: &FilterExpression,
        limit: CountLimit,
    ) -> gentree_search::Result<u64> {
        let (sql, bind_values) = PersonQuery::new(&self.table, filter).build_count_sql(limit);

        let total = bind_all(sqlx::query_scalar::<_, i64>(&sql), bind_values)
            .fetch_one(&self.pool)
            .await
            .map_err(SearchError::collection)?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn find(
        &self,
        filter: &FilterExpression,
        options: FindOptions,
    ) -> gentree_search::Result<RecordStream> {
        let (sql, bind_values) = PersonQuery::new(&self.table, filter).build_find_sql(&options);
        let pool = self.pool.clone();

        let records = stream! {
            let query = bind_all(sqlx::query_scalar::<_, JsonValue>(&sql), bind_values);
            let mut rows = query.fetch(&pool);
            loop {
                match rows.try_next().await {
                    Ok(Some(document)) => yield into_record(document),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(SearchError::collection(e));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(records))
    }
}

fn into_record(document: JsonValue) -> gentree_search::Result<PersonRecord> {
    match document {
        JsonValue::Object(record) => Ok(record),
        other => Err(SearchError::collection(NotAnObject(other))),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("stored person document is not a JSON object: {0}")]
struct NotAnObject(JsonValue);
