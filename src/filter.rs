use crate::types::IssueSummary;
use chrono::Datelike;

/// True when the issue was open at some point during `year`.
pub fn open_during(issue: &IssueSummary, year: i32) -> bool {
    let created = issue.created_at.year();
    if created == year {
        return true;
    }
    created <= year && issue.closed_at.map_or(true, |c| c.year() >= year)
}

/// Order-preserving subset of `issues` that were open during `year`.
pub fn filter_by_year(issues: &[IssueSummary], year: i32) -> Vec<IssueSummary> {
    issues
        .iter()
        .filter(|i| open_during(i, year))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn issue(number: u64, created: &str, closed: Option<&str>) -> IssueSummary {
        IssueSummary {
            owner: "o".into(),
            repo: "r".into(),
            number,
            title: format!("issue {number}"),
            body: None,
            labels: vec![],
            author: None,
            created_at: at(created),
            closed_at: closed.map(at),
            private: false,
        }
    }

    #[test]
    fn created_in_year_is_kept() {
        let i = issue(1, "2021-05-01T00:00:00Z", Some("2022-01-01T00:00:00Z"));
        assert!(open_during(&i, 2021));
    }

    #[test]
    fn created_after_year_is_dropped() {
        let i = issue(1, "2021-05-01T00:00:00Z", Some("2022-01-01T00:00:00Z"));
        assert!(!open_during(&i, 2020));
    }

    #[test]
    fn still_open_issue_spans_later_years() {
        let i = issue(1, "2019-01-01T00:00:00Z", None);
        assert!(open_during(&i, 2023));
    }

    #[test]
    fn closed_before_year_is_dropped() {
        let i = issue(1, "2018-03-01T00:00:00Z", Some("2019-12-31T23:59:59Z"));
        assert!(!open_during(&i, 2020));
        assert!(open_during(&i, 2019));
    }

    #[test]
    fn preserves_input_order() {
        let issues = vec![
            issue(1, "2019-01-01T00:00:00Z", Some("2019-02-01T00:00:00Z")),
            issue(2, "2021-01-01T00:00:00Z", None),
            issue(3, "2021-06-01T00:00:00Z", None),
        ];
        let kept: Vec<u64> = filter_by_year(&issues, 2021)
            .iter()
            .map(|i| i.number)
            .collect();
        assert_eq!(kept, vec![2, 3]);
    }

    #[test]
    fn empty_input_yields_empty() {
        assert!(filter_by_year(&[], 2021).is_empty());
    }
}
