use chrono::NaiveDate;

/// Optional date range and account restriction for the report endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub account: Option<i64>,
}

impl ReportFilter {
    /// Query parameters for the present fields only.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(start) = self.start {
            query.push(("start".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            query.push(("end".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(account) = self.account {
            query.push(("account".to_string(), account.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_query() {
        let filter = ReportFilter::default();
        assert!(filter.to_query().is_empty());
    }

    #[test]
    fn test_only_present_fields_serialized() {
        let filter = ReportFilter {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: None,
            account: Some(4),
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("start".to_string(), "2025-01-01".to_string()),
                ("account".to_string(), "4".to_string()),
            ]
        );
    }
}
