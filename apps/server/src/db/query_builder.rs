//! SQL for person searches over a JSONB `document` column.
//!
//! Each filter clause becomes one predicate on `document #> path`, where the
//! path is the clause field split on `.` (numeric segments index arrays).
//! Array fields match when any element does, the same way the in-memory
//! collection evaluates them.

use gentree_search::{
    filter::Clause, Condition, CountLimit, FilterExpression, FindOptions,
};
use serde_json::Value as JsonValue;

use super::sql::quote_identifier;

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
    Json(JsonValue),
    BigInt(i64),
}

fn push(bind_params: &mut Vec<BindValue>, value: BindValue) -> usize {
    bind_params.push(value);
    bind_params.len()
}

/// Builds count and page queries for one filter against one table.
///
/// `table` must already be validated with [`super::validate_identifier`].
#[derive(Debug, Clone, Copy)]
pub struct PersonQuery<'a> {
    table: &'a str,
    filter: &'a FilterExpression,
}

impl<'a> PersonQuery<'a> {
    pub fn new(table: &'a str, filter: &'a FilterExpression) -> Self {
        Self { table, filter }
    }

    pub fn build_count_sql(&self, limit: CountLimit) -> (String, Vec<BindValue>) {
        let mut binds = Vec::new();
        let table = quote_identifier(self.table);
        let where_sql = self.where_clause(&mut binds);

        let sql = match limit {
            CountLimit::Unbounded => format!("SELECT COUNT(*) FROM {table} WHERE {where_sql}"),
            CountLimit::AtMost(cap) => {
                let cap_idx = push(&mut binds, BindValue::BigInt(to_i64(cap)));
                format!(
                    "SELECT COUNT(*) FROM (SELECT 1 FROM {table} WHERE {where_sql} LIMIT ${cap_idx}) AS capped"
                )
            }
        };
        (sql, binds)
    }

    /// Page query returning one `document` column, in insertion order.
    pub fn build_find_sql(&self, options: &FindOptions) -> (String, Vec<BindValue>) {
        let mut binds = Vec::new();
        let table = quote_identifier(self.table);

        let select = match &options.projection {
            Some(fields) => {
                let idx = push(&mut binds, BindValue::TextArray(fields.clone()));
                format!(
                    "(SELECT COALESCE(jsonb_object_agg(f.key, f.value), '{{}}'::jsonb) \
                     FROM jsonb_each(document) AS f(key, value) \
                     WHERE f.key = ANY(${idx}::text[])) AS document"
                )
            }
            None => "document".to_string(),
        };

        let where_sql = self.where_clause(&mut binds);
        let mut sql = format!("SELECT {select} FROM {table} WHERE {where_sql} ORDER BY seq");

        if options.skip > 0 {
            let idx = push(&mut binds, BindValue::BigInt(to_i64(options.skip)));
            sql.push_str(&format!(" OFFSET ${idx}"));
        }
        if let Some(limit) = options.limit {
            let idx = push(&mut binds, BindValue::BigInt(to_i64(limit)));
            sql.push_str(&format!(" LIMIT ${idx}"));
        }

        (sql, binds)
    }

    fn where_clause(&self, binds: &mut Vec<BindValue>) -> String {
        let mut predicates: Vec<String> = self
            .filter
            .clauses()
            .iter()
            .map(|clause| clause_sql(clause, binds))
            .collect();

        if let Some(alternatives) = self.filter.any_of() {
            if alternatives.is_empty() {
                predicates.push("FALSE".to_string());
            } else {
                let any: Vec<String> = alternatives
                    .iter()
                    .map(|clause| clause_sql(clause, binds))
                    .collect();
                predicates.push(format!("({})", any.join(" OR ")));
            }
        }

        if predicates.is_empty() {
            "TRUE".to_string()
        } else {
            predicates.join(" AND ")
        }
    }
}

fn clause_sql(clause: &Clause, binds: &mut Vec<BindValue>) -> String {
    let path_idx = push(binds, BindValue::TextArray(path_segments(&clause.field)));
    let value = format!("(document #> ${path_idx}::text[])");

    match &clause.condition {
        Condition::Missing => format!("{value} IS NULL"),
        // Scalar containment also holds for arrays holding the scalar.
        Condition::Equals(expected) => {
            let idx = push(binds, BindValue::Json(expected.clone()));
            format!("{value} @> ${idx}::jsonb")
        }
        Condition::Range { min, max } => {
            let min_idx = push(binds, BindValue::BigInt(*min));
            let max_idx = push(binds, BindValue::BigInt(*max));
            format!(
                "EXISTS (SELECT 1 FROM {elements} AS e(value) \
                 WHERE CASE WHEN jsonb_typeof(e.value) = 'number' THEN (e.value)::numeric END \
                 BETWEEN ${min_idx} AND ${max_idx})",
                elements = elements_of(&value)
            )
        }
        Condition::Prefix(prefix) => {
            let idx = push(binds, BindValue::Text(prefix.clone()));
            format!(
                "EXISTS (SELECT 1 FROM {elements} AS e(value) \
                 WHERE jsonb_typeof(e.value) = 'string' AND starts_with(e.value #>> '{{}}', ${idx}))",
                elements = elements_of(&value)
            )
        }
    }
}

/// A JSONB value as a set of elements: arrays unnest, scalars stand alone.
fn elements_of(value: &str) -> String {
    format!(
        "jsonb_array_elements(CASE jsonb_typeof({value}) WHEN 'array' THEN {value} \
         ELSE jsonb_build_array({value}) END)"
    )
}

fn path_segments(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter() -> FilterExpression {
        let mut filter = FilterExpression::new();
        filter.set("archived", Condition::Missing);
        filter.set("birth_year", Condition::Range { min: 1905, max: 1909 });
        filter.set("name_lc.1", Condition::Equals(json!("cohen")));
        filter
    }

    #[test]
    fn where_clause_binds_paths_and_values_in_order() {
        let filter = filter();
        let (sql, binds) = PersonQuery::new("persons", &filter).build_count_sql(CountLimit::Unbounded);

        assert!(sql.starts_with("SELECT COUNT(*) FROM \"persons\" WHERE "));
        assert!(sql.contains("(document #> $1::text[]) IS NULL"));
        assert!(sql.contains("BETWEEN $3 AND $4"));
        assert!(sql.contains("(document #> $5::text[]) @> $6::jsonb"));
        assert_eq!(
            binds,
            vec![
                BindValue::TextArray(vec!["archived".into()]),
                BindValue::TextArray(vec!["birth_year".into()]),
                BindValue::BigInt(1905),
                BindValue::BigInt(1909),
                BindValue::TextArray(vec!["name_lc".into(), "1".into()]),
                BindValue::Json(json!("cohen")),
            ]
        );
    }

    #[test]
    fn capped_count_wraps_a_limited_subquery() {
        let filter = filter();
        let (sql, binds) = PersonQuery::new("persons", &filter).build_count_sql(CountLimit::AtMost(25));

        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT 1 FROM \"persons\" WHERE "));
        assert!(sql.ends_with("LIMIT $7) AS capped"));
        assert_eq!(binds.last(), Some(&BindValue::BigInt(25)));
    }

    #[test]
    fn disjunction_is_one_parenthesized_group() {
        let mut filter = FilterExpression::new();
        filter.set("deceased", Condition::Equals(json!(true)));
        filter.set_any_of(vec![
            Clause::new("BIRT_PLAC_lc", Condition::Equals(json!("lodz"))),
            Clause::new("DEAT_PLAC_lc", Condition::Equals(json!("lodz"))),
        ]);
        let (sql, _) = PersonQuery::new("persons", &filter).build_count_sql(CountLimit::Unbounded);

        assert!(sql.ends_with(
            "(document #> $1::text[]) @> $2::jsonb AND \
             ((document #> $3::text[]) @> $4::jsonb OR (document #> $5::text[]) @> $6::jsonb)"
        ));
    }

    #[test]
    fn prefix_binds_the_raw_prefix() {
        let mut filter = FilterExpression::new();
        filter.set("name_lc.1", Condition::Prefix("co.hen".into()));
        let (sql, binds) = PersonQuery::new("persons", &filter).build_count_sql(CountLimit::Unbounded);

        assert!(sql.contains("starts_with(e.value #>> '{}', $2)"));
        assert_eq!(binds[1], BindValue::Text("co.hen".into()));
    }

    #[test]
    fn find_projects_pages_and_orders() {
        let filter = FilterExpression::new();
        let options = FindOptions {
            projection: Some(vec!["id".into(), "name".into()]),
            skip: 30,
            limit: Some(15),
        };
        let (sql, binds) = PersonQuery::new("persons", &filter).build_find_sql(&options);

        assert!(sql.contains("WHERE f.key = ANY($1::text[])) AS document"));
        assert!(sql.ends_with("WHERE TRUE ORDER BY seq OFFSET $2 LIMIT $3"));
        assert_eq!(
            binds,
            vec![
                BindValue::TextArray(vec!["id".into(), "name".into()]),
                BindValue::BigInt(30),
                BindValue::BigInt(15),
            ]
        );
    }

    #[test]
    fn find_without_projection_or_paging() {
        let filter = FilterExpression::new();
        let (sql, binds) =
            PersonQuery::new("persons", &filter).build_find_sql(&FindOptions::default());
        assert_eq!(sql, "SELECT document FROM \"persons\" WHERE TRUE ORDER BY seq");
        assert!(binds.is_empty());
    }
}
