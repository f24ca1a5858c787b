use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

/// Assert a 200 search response and return `(total, results)`.
pub fn assert_search_ok(status: StatusCode, body: &Value) -> anyhow::Result<(u64, &Vec<Value>)> {
    assert_eq!(status, StatusCode::OK, "unexpected status, body: {body}");
    let total = body
        .get("total")
        .and_then(Value::as_u64)
        .context("total is a number")?;
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .context("results is an array")?;
    Ok((total, results))
}

/// Assert a 400 with the given client-facing message.
pub fn assert_bad_request(status: StatusCode, body: &Value, message: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected status, body: {body}");
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(message),
        "unexpected error body: {body}"
    );
}

/// Person ids of a result page, in order.
pub fn result_ids(results: &[Value]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}
