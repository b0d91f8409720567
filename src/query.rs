//! Query Service
//!
//! Read-only view over the [`SampleStore`] backing the two HTTP request
//! types: the paginated day listing and the per-day sample series. Day
//! series are reduced to a bounded point count with stride sampling (every
//! k-th element, no averaging) so the chart stays small without server-side
//! aggregation.

use crate::battery::Sample;
use crate::store::{SampleStore, StoreError};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;

/// Default number of days per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Ceiling on points in a charted day series.
pub const MAX_CHART_POINTS: usize = 70;

/// Errors surfaced by the query service.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Malformed or out-of-range request parameter
    #[error("{0}")]
    Validation(String),

    /// Requested page at or beyond the last page
    #[error("requested page exceeds total available pages")]
    PageOutOfRange,

    /// Persistence layer failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of the day listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayListing {
    /// Days on this page, most recent first
    pub dates: Vec<NaiveDate>,
    /// Total distinct days across all pages
    pub total_items: usize,
    /// Total pages at the requested size
    pub total_pages: usize,
}

/// Pure-read query layer over a shared [`SampleStore`].
pub struct QueryService {
    store: Arc<SampleStore>,
}

impl QueryService {
    pub fn new(store: Arc<SampleStore>) -> Self {
        Self { store }
    }

    /// List distinct sample days, newest first.
    ///
    /// `page` is zero-indexed and the offset is `page * size`. Asking for
    /// `page >= total_pages` (which includes page 0 of an empty store) is
    /// [`QueryError::PageOutOfRange`].
    pub fn list_days(&self, page: usize, size: usize) -> Result<DayListing, QueryError> {
        if size == 0 {
            return Err(QueryError::Validation(
                "size must be greater than zero".to_string(),
            ));
        }

        let day_page = self.store.list_days(size, page * size)?;
        if page >= day_page.total_pages {
            return Err(QueryError::PageOutOfRange);
        }

        Ok(DayListing {
            dates: day_page.days,
            total_items: day_page.total_items,
            total_pages: day_page.total_pages,
        })
    }

    /// The sample series for one host-local day (default: today), ascending
    /// by timestamp and stride-downsampled to roughly [`MAX_CHART_POINTS`].
    /// A day with no samples yields an empty series, not an error.
    pub fn samples_for_date(&self, date: Option<NaiveDate>) -> Result<Vec<Sample>, QueryError> {
        let day = date.unwrap_or_else(|| Local::now().date_naive());
        let samples = self.store.samples_for_day(day)?;
        Ok(downsample(samples, MAX_CHART_POINTS))
    }
}

/// Stride-downsample `list` to roughly `max_points` elements.
///
/// Keeps every `floor(len / max_points)`-th element starting at index 0,
/// preserving order, so the first element always survives. Input at or
/// below the ceiling is returned unchanged.
pub fn downsample<T>(list: Vec<T>, max_points: usize) -> Vec<T> {
    if max_points == 0 || list.len() <= max_points {
        return list;
    }
    let step = list.len() / max_points;
    list.into_iter().step_by(step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::Status;
    use chrono::{DateTime, Duration, Utc};

    fn service_with_days(counts: &[usize]) -> QueryService {
        let store = SampleStore::open_in_memory().unwrap();
        store.migrate().unwrap();

        for (days_ago, &count) in counts.iter().enumerate() {
            let noon = local_noon(days_ago as i64);
            for i in 0..count {
                store
                    .insert(&Sample {
                        timestamp: noon + Duration::seconds(i as i64),
                        percent: 50.0,
                        status: Status::Discharging,
                    })
                    .unwrap();
            }
        }

        QueryService::new(Arc::new(store))
    }

    fn local_noon(days_ago: i64) -> DateTime<Utc> {
        let day = Local::now().date_naive() - Duration::days(days_ago);
        day.and_hms_opt(12, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_downsample_140_to_70() {
        let input: Vec<usize> = (0..140).collect();
        let out = downsample(input.clone(), 70);

        assert_eq!(out.len(), 70);
        assert_eq!(out[0], 0, "first element must survive");

        // Strict order-preserving subsequence of the input
        let mut cursor = input.iter();
        for kept in &out {
            assert!(cursor.any(|v| v == kept));
        }
    }

    #[test]
    fn test_downsample_noop_at_or_below_limit() {
        let input: Vec<usize> = (0..70).collect();
        assert_eq!(downsample(input.clone(), 70), input);

        let short: Vec<usize> = (0..3).collect();
        assert_eq!(downsample(short.clone(), 70), short);

        assert!(downsample(Vec::<usize>::new(), 70).is_empty());
    }

    #[test]
    fn test_list_days_two_day_scenario() {
        // Three samples today, four yesterday, size 1
        let service = service_with_days(&[3, 4]);

        let listing = service.list_days(0, 1).unwrap();
        assert_eq!(listing.total_items, 2);
        assert_eq!(listing.total_pages, 2);
        assert_eq!(listing.dates, vec![Local::now().date_naive()]);
    }

    #[test]
    fn test_list_days_page_out_of_range() {
        let service = service_with_days(&[1, 1]);

        assert!(service.list_days(1, 1).is_ok());
        assert!(matches!(
            service.list_days(2, 1),
            Err(QueryError::PageOutOfRange)
        ));
    }

    #[test]
    fn test_list_days_empty_store_is_out_of_range() {
        let service = service_with_days(&[]);
        assert!(matches!(
            service.list_days(0, DEFAULT_PAGE_SIZE),
            Err(QueryError::PageOutOfRange)
        ));
    }

    #[test]
    fn test_list_days_zero_size_rejected() {
        let service = service_with_days(&[1]);
        assert!(matches!(
            service.list_days(0, 0),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_samples_for_date_downsamples() {
        let service = service_with_days(&[140]);
        let samples = service
            .samples_for_date(Some(Local::now().date_naive()))
            .unwrap();
        assert_eq!(samples.len(), 70);
    }

    #[test]
    fn test_samples_for_unknown_date_is_empty() {
        let service = service_with_days(&[2]);
        let missing = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(service.samples_for_date(Some(missing)).unwrap().is_empty());
    }
}
