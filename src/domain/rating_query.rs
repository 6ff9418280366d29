//! Rating listing query: raw parameters in, a typed query out.
//!
//! Parsing runs in three fixed stages (filter, sort, paginate) over the
//! untrusted parameters. Nothing here touches the database: the repository
//! applies the resulting [`RatingQuery`] in the same stage order and then
//! hydrates products and users for the returned page.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 25;
pub const MAX_PER_PAGE: i64 = 100;

/// Query-string parameters as received. Every value stays a string until a
/// stage decides what to make of it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingQueryParams {
    pub product_id: Option<String>,
    pub user_id: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Conjunctive filters; `None` means the filter is not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingFilters {
    pub product_id: Option<i64>,
    pub user_id: Option<i64>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Sortable columns. Only these can ever reach an ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Value,
    #[default]
    CreatedAt,
    ProductId,
    UserId,
}

impl SortColumn {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("value") => SortColumn::Value,
            Some("created_at") | None => SortColumn::CreatedAt,
            Some("product_id") => SortColumn::ProductId,
            Some("user_id") => SortColumn::UserId,
            Some(other) => {
                log::debug!("Ignoring unsupported sort_by {other:?}");
                SortColumn::CreatedAt
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub per_page: i64,
}

impl PaginationMeta {
    pub fn new(page: PageRequest, total_count: i64) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + page.per_page - 1) / page.per_page
        };
        Self {
            current_page: page.page,
            total_pages,
            total_count,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingQuery {
    pub filters: RatingFilters,
    pub sort: Sort,
    pub page: PageRequest,
}

impl RatingQuery {
    pub fn from_params(params: &RatingQueryParams) -> Self {
        Self {
            filters: filter_stage(params),
            sort: sort_stage(params),
            page: paginate_stage(params),
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::debug!("Ignoring unparseable {name} {raw:?}");
            None
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Lower,
    Upper,
}

/// Timestamps are taken as given; a bare date covers the whole UTC day.
fn parse_timestamp(name: &str, raw: Option<&str>, bound: Bound) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = match bound {
            Bound::Lower => NaiveTime::from_hms_opt(0, 0, 0)?,
            Bound::Upper => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?,
        };
        return Some(date.and_time(time).and_utc());
    }

    log::debug!("Ignoring unparseable {name} {raw:?}");
    None
}

pub fn filter_stage(params: &RatingQueryParams) -> RatingFilters {
    RatingFilters {
        product_id: parse_number("product_id", params.product_id.as_deref()),
        user_id: parse_number("user_id", params.user_id.as_deref()),
        min_rating: parse_number("min_rating", params.min_rating.as_deref()),
        max_rating: parse_number("max_rating", params.max_rating.as_deref()),
        from: parse_timestamp("from_date", params.from_date.as_deref(), Bound::Lower),
        to: parse_timestamp("to_date", params.to_date.as_deref(), Bound::Upper),
    }
}

pub fn sort_stage(params: &RatingQueryParams) -> Sort {
    Sort {
        column: SortColumn::parse(params.sort_by.as_deref()),
        direction: SortDirection::parse(params.direction.as_deref()),
    }
}

pub fn paginate_stage(params: &RatingQueryParams) -> PageRequest {
    let page = parse_number::<i64>("page", params.page.as_deref())
        .unwrap_or(DEFAULT_PAGE)
        .max(1);
    let per_page = parse_number::<i64>("per_page", params.per_page.as_deref())
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    PageRequest { page, per_page }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn params() -> RatingQueryParams {
        RatingQueryParams::default()
    }

    #[test]
    fn defaults_without_parameters() {
        let query = RatingQuery::from_params(&params());
        assert_eq!(query.filters, RatingFilters::default());
        assert_eq!(query.sort, Sort { column: SortColumn::CreatedAt, direction: SortDirection::Desc });
        assert_eq!(query.page, PageRequest { page: 1, per_page: 25 });
    }

    #[test]
    fn filters_parse_numbers() {
        let query = RatingQuery::from_params(&RatingQueryParams {
            product_id: Some("7".into()),
            user_id: Some("3".into()),
            min_rating: Some("4".into()),
            max_rating: Some(" 5 ".into()),
            ..params()
        });
        assert_eq!(query.filters.product_id, Some(7));
        assert_eq!(query.filters.user_id, Some(3));
        assert_eq!(query.filters.min_rating, Some(4));
        assert_eq!(query.filters.max_rating, Some(5));
    }

    #[test]
    fn unparseable_filters_are_dropped() {
        let query = RatingQuery::from_params(&RatingQueryParams {
            product_id: Some("abc".into()),
            min_rating: Some("".into()),
            from_date: Some("yesterday".into()),
            ..params()
        });
        assert_eq!(query.filters, RatingFilters::default());
    }

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let query = RatingQuery::from_params(&RatingQueryParams {
            from_date: Some("2025-10-01".into()),
            to_date: Some("2025-10-02".into()),
            ..params()
        });
        assert_eq!(query.filters.from, Some(Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()));
        let to = query.filters.to.expect("to bound");
        assert_eq!(to.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 2).unwrap());
        assert_eq!(to.time(), NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());
    }

    #[test]
    fn timestamps_with_offsets_are_normalized_to_utc() {
        let query = RatingQuery::from_params(&RatingQueryParams {
            from_date: Some("2025-10-01T12:00:00+02:00".into()),
            ..params()
        });
        assert_eq!(query.filters.from, Some(Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn whitelisted_sort_columns_are_honoured() {
        for (raw, column) in [
            ("value", SortColumn::Value),
            ("created_at", SortColumn::CreatedAt),
            ("product_id", SortColumn::ProductId),
            ("user_id", SortColumn::UserId),
        ] {
            assert_eq!(SortColumn::parse(Some(raw)), column);
        }
    }

    #[test]
    fn unknown_sort_column_falls_back_to_created_at() {
        let query = RatingQuery::from_params(&RatingQueryParams {
            sort_by: Some("\"; DROP TABLE ratings; --".into()),
            direction: Some("sideways".into()),
            ..params()
        });
        assert_eq!(query.sort.column, SortColumn::CreatedAt);
        assert_eq!(query.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn ascending_direction_is_recognized() {
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Desc);
    }

    #[test]
    fn per_page_is_clamped_to_maximum() {
        let page = paginate_stage(&RatingQueryParams {
            per_page: Some("500".into()),
            ..params()
        });
        assert_eq!(page.per_page, 100);
    }

    #[test]
    fn nonsense_pagination_falls_back() {
        let page = paginate_stage(&RatingQueryParams {
            page: Some("-3".into()),
            per_page: Some("lots".into()),
            ..params()
        });
        assert_eq!(page, PageRequest { page: 1, per_page: 25 });

        let page = paginate_stage(&RatingQueryParams {
            per_page: Some("0".into()),
            ..params()
        });
        assert_eq!(page.per_page, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest { page: 3, per_page: 25 }.offset(), 50);
    }

    #[test]
    fn pagination_meta_rounds_pages_up() {
        let meta = PaginationMeta::new(PageRequest { page: 1, per_page: 2 }, 3);
        assert_eq!(meta, PaginationMeta { current_page: 1, total_pages: 2, total_count: 3, per_page: 2 });
        assert_eq!(PaginationMeta::new(PageRequest::default(), 0).total_pages, 0);
    }
}
