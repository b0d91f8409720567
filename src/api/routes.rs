//! Route Handlers
//!
//! - `GET /dates` - paginated listing of days that have samples
//! - `GET /data`  - downsampled sample series for one day
//! - `GET /health` - liveness and uptime
//! - `GET /`, `/index.js`, `/styles.css` - the embedded front-end

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::api::dto::{DataParams, DatesParams, DatesResponse, HealthResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::battery::Sample;
use crate::query::DEFAULT_PAGE_SIZE;

// Front-end bundled into the binary at build time.
const INDEX_HTML: &str = include_str!("../../assets/index.html");
const INDEX_JS: &str = include_str!("../../assets/index.js");
const STYLES_CSS: &str = include_str!("../../assets/styles.css");

/// GET /dates?page=N&size=M
pub async fn list_dates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatesParams>,
) -> ApiResult<Json<DatesResponse>> {
    let page = parse_non_negative(params.page.as_deref(), "page", 0)?;
    let size = parse_positive(params.size.as_deref(), "size", DEFAULT_PAGE_SIZE)?;

    let listing = state.query.list_days(page, size)?;

    Ok(Json(DatesResponse {
        total_pages: listing.total_pages,
        total_items: listing.total_items,
        dates: listing.dates,
    }))
}

/// GET /data?date=YYYY-MM-DD
pub async fn day_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataParams>,
) -> ApiResult<Json<Vec<Sample>>> {
    let date = params
        .date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                ApiError::Validation(format!("invalid date format for \"date\": {}", e))
            })
        })
        .transpose()?;

    let samples = state.query.samples_for_date(date)?;
    Ok(Json(samples))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /index.js
pub async fn index_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], INDEX_JS)
}

/// GET /styles.css
pub async fn styles_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLES_CSS)
}

fn parse_non_negative(
    raw: Option<&str>,
    name: &str,
    default: usize,
) -> Result<usize, ApiError> {
    match raw {
        None => Ok(default),
        Some(s) => {
            let value: i64 = s.parse().map_err(|_| {
                ApiError::Validation(format!("invalid value {:?} for \"{}\"", s, name))
            })?;
            if value < 0 {
                return Err(ApiError::Validation(format!(
                    "\"{}\" cannot be less than 0",
                    name
                )));
            }
            Ok(value as usize)
        }
    }
}

fn parse_positive(raw: Option<&str>, name: &str, default: usize) -> Result<usize, ApiError> {
    let value = parse_non_negative(raw, name, default)?;
    if value == 0 {
        return Err(ApiError::Validation(format!(
            "\"{}\" must be greater than 0",
            name
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative(None, "page", 0).unwrap(), 0);
        assert_eq!(parse_non_negative(Some("7"), "page", 0).unwrap(), 7);
        assert!(parse_non_negative(Some("-1"), "page", 0).is_err());
        assert!(parse_non_negative(Some("abc"), "page", 0).is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(None, "size", 5).unwrap(), 5);
        assert_eq!(parse_positive(Some("1"), "size", 5).unwrap(), 1);
        assert!(parse_positive(Some("0"), "size", 5).is_err());
        assert!(parse_positive(Some("-3"), "size", 5).is_err());
    }
}
