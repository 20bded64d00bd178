use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sort orders the course listing supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::Newest => "newest",
        }
    }
}

/// Filters for the public course listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CourseFilters {
    /// Query parameters in a stable order; unset and blank values are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = non_blank(self.search.as_deref()) {
            pairs.push(("search", search));
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            pairs.push(("category", category));
        }
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .collect();
        if !tags.is_empty() {
            pairs.push(("tags", tags.join(",")));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_owned()));
        }
        if let Some(page) = self.page.filter(|page| *page > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_courses: u64,
    pub total_students: u64,
    pub total_enrollments: u64,
    pub total_assignments: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyEnrollments {
    pub date: NaiveDate,
    pub count: u64,
}

/// Enrollments per day over a reporting window, oldest day first.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentAnalytics {
    pub days: Vec<DailyEnrollments>,
    pub total_enrollments: u64,
    pub average_per_day: f64,
    /// First and last day covered, `None` for an empty window.
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl EnrollmentAnalytics {
    /// Summarize a series of daily counts. Days missing from the series
    /// count as zero when averaging.
    #[must_use]
    pub fn from_days(mut days: Vec<DailyEnrollments>) -> Self {
        days.sort_by_key(|d| d.date);
        let range = days.first().zip(days.last()).map(|(a, b)| (a.date, b.date));
        let total_enrollments = days.iter().map(|d| d.count).sum();
        let average_per_day = match range {
            Some((start, end)) => {
                let span = (end - start).num_days() + 1;
                total_enrollments as f64 / span as f64
            }
            None => 0.0,
        };
        Self {
            days,
            total_enrollments,
            average_per_day,
            range,
        }
    }

    /// Busiest day; the earliest one wins a tie.
    #[must_use]
    pub fn peak(&self) -> Option<&DailyEnrollments> {
        self.days
            .iter()
            .rev()
            .max_by_key(|d| d.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_produce_no_query() {
        assert!(CourseFilters::default().query_pairs().is_empty());
    }

    #[test]
    fn filters_skip_blank_values() {
        let filters = CourseFilters {
            search: Some("  rust ".into()),
            category: Some("   ".into()),
            tags: vec!["async".into(), " ".into(), "tokio".into()],
            sort: Some(SortOrder::PriceDesc),
            page: Some(0),
            limit: Some(12),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("search", "rust".to_owned()),
                ("tags", "async,tokio".to_owned()),
                ("sort", "price_desc".to_owned()),
                ("limit", "12".to_owned()),
            ]
        );
    }

    #[test]
    fn page_has_next() {
        let page: Page<u8> = Page {
            items: Vec::new(),
            meta: PageMeta {
                total: 25,
                page: 2,
                limit: 10,
                total_pages: 3,
            },
        };
        assert!(page.has_next());
    }

    fn day(date: &str, count: u64) -> DailyEnrollments {
        DailyEnrollments {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            count,
        }
    }

    #[test]
    fn analytics_average_over_the_whole_window() {
        let analytics = EnrollmentAnalytics::from_days(vec![
            day("2024-03-04", 2),
            day("2024-03-01", 4),
            day("2024-03-02", 4),
        ]);
        assert_eq!(analytics.total_enrollments, 10);
        assert_eq!(analytics.days[0].date, day("2024-03-01", 0).date);
        assert!((analytics.average_per_day - 2.5).abs() < f64::EPSILON);
        assert_eq!(analytics.peak().unwrap().date, day("2024-03-01", 0).date);
    }

    #[test]
    fn empty_analytics_have_no_range() {
        let analytics = EnrollmentAnalytics::from_days(Vec::new());
        assert_eq!(analytics.range, None);
        assert!(analytics.peak().is_none());
        assert!(analytics.average_per_day.abs() < f64::EPSILON);
    }
}
