//! Person search handler
//!
//! `GET /v1/search?last_name=cohen&birth_year=1907:2&start=15`
//!
//! Query parameters are passed through in request order; repeated keys keep
//! their first value. Validation happens in the search core.

use axum::{
    extract::{RawQuery, State},
    Extension, Json,
};
use gentree_search::PersonRecord;
use serde::Serialize;

use crate::{request_context::RequestContext, state::AppState, Result};

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: u64,
    pub results: Vec<PersonRecord>,
}

pub async fn search_persons(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    RawQuery(query): RawQuery,
) -> Result<Json<SearchResponse>> {
    let items = decode_query(query.as_deref());
    let (total, results) = state.search.search_items(items.as_slice()).await?.collect().await?;

    tracing::debug!(
        request_id = context.as_ref().map(|Extension(c)| c.request_id.as_str()),
        total,
        returned = results.len(),
        "Search completed"
    );

    Ok(Json(SearchResponse { total, results }))
}

fn decode_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_in_order_with_percent_and_plus() {
        let items = decode_query(Some("last_name=bar%20yehuda&place=tel+aviv&first_name=moshe%3Bprefix"));
        assert_eq!(
            items,
            vec![
                ("last_name".to_string(), "bar yehuda".to_string()),
                ("place".to_string(), "tel aviv".to_string()),
                ("first_name".to_string(), "moshe;prefix".to_string()),
            ]
        );
    }

    #[test]
    fn missing_query_is_empty() {
        assert!(decode_query(None).is_empty());
        assert!(decode_query(Some("")).is_empty());
    }
}
