// src/job_board/mod.rs
//! Scraping of the job board: search result pagination and posting details.

pub mod fetcher;
pub mod job_scraper;
pub mod types;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use job_scraper::{CategoryCrawl, JobScraper};
pub use types::{JobListing, JobStub};
