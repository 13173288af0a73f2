// src/dedup.rs
use std::collections::HashSet;

/// Anything identified by its posting URL.
pub trait UrlKeyed {
    fn url(&self) -> &str;
}

/// Keep the first item seen for each URL, in first-seen order.
pub fn dedup_by_url<T: UrlKeyed>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if seen.insert(item.url().to_string()) {
            unique.push(item);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_board::JobListing;

    fn listing(title: &str, url: &str, category: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            description: "Lead things".to_string(),
            url: url.to_string(),
            category: category.to_string(),
            page: 1,
        }
    }

    #[test]
    fn test_keeps_first_seen_across_categories() {
        let listings = vec![
            listing("Strategy Lead", "https://board/jobs/1", "strategy"),
            listing("Senior Consultant", "https://board/jobs/1", "consulting"),
        ];
        let unique = dedup_by_url(listings);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].title, "Strategy Lead");
        assert_eq!(unique[0].category, "strategy");
    }

    #[test]
    fn test_output_len_equals_unique_urls_and_preserves_order() {
        let listings = vec![
            listing("A", "u1", "x"),
            listing("B", "u2", "x"),
            listing("C", "u1", "y"),
            listing("D", "u3", "y"),
            listing("E", "u2", "z"),
        ];
        let unique = dedup_by_url(listings);
        let urls: Vec<&str> = unique.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["u1", "u2", "u3"]);
        let titles: Vec<&str> = unique.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_idempotent() {
        let listings = vec![
            listing("A", "u1", "x"),
            listing("B", "u1", "x"),
            listing("C", "u2", "x"),
        ];
        let once = dedup_by_url(listings);
        let twice = dedup_by_url(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let unique: Vec<JobListing> = dedup_by_url(Vec::new());
        assert!(unique.is_empty());
    }
}
