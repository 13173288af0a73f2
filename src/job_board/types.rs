// src/job_board/types.rs
use crate::dedup::UrlKeyed;

/// A posting as it appears on a search result page, before its detail page
/// has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStub {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub category: String,
    pub page: u32,
}

/// A fully scraped posting, description included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub page: u32,
}

impl JobStub {
    pub fn into_listing(self, description: String) -> JobListing {
        JobListing {
            title: self.title,
            company: self.company,
            location: self.location,
            description,
            url: self.url,
            category: self.category,
            page: self.page,
        }
    }
}

impl UrlKeyed for JobStub {
    fn url(&self) -> &str {
        &self.url
    }
}

impl UrlKeyed for JobListing {
    fn url(&self) -> &str {
        &self.url
    }
}
