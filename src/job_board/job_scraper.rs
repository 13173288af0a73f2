// src/job_board/job_scraper.rs
use super::fetcher::PageFetcher;
use super::types::{JobListing, JobStub};
use crate::error::FetchError;
use crate::retry::{polite_pause, retry_with_backoff, RetryPolicy};
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

const CARD_SELECTOR: &str = "li.list-none";
const TITLE_SELECTOR: &str = "h2[itemprop='title']";
const URL_SELECTORS: [&str; 2] = ["h2[itemprop='title'] a[itemprop='url']", "a[itemprop='url']"];
const COMPANY_SELECTOR: &str = "a[itemprop='hiringOrganization']";
const LOCATION_SELECTOR: &str = "span.text-gray-600";
const DESCRIPTION_SELECTOR: &str = "div[itemprop='description']";

pub struct JobScraper {
    fetcher: Box<dyn PageFetcher>,
    base_url: Url,
    page_delay: Duration,
    retry: RetryPolicy,
}

impl JobScraper {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        base_url: &str,
        page_delay: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            base_url,
            page_delay,
            retry,
        })
    }

    /// Search result URL for one category page (pages start at 1).
    pub fn search_url(&self, category: &str, page: u32) -> String {
        let mut url = self.base_url.clone();
        let path = format!("{}/", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("search", category)
            .append_pair("tags", "")
            .append_pair("sort_by", "newest")
            .append_pair("page", &page.to_string());
        url.to_string()
    }

    /// Lazily walk the result pages of one category.
    pub fn crawl(&self, category: &str, max_pages: u32) -> CategoryCrawl<'_> {
        CategoryCrawl {
            scraper: self,
            category: category.to_string(),
            next_page: 1,
            max_pages,
            finished: false,
        }
    }

    /// Collect every stub a category yields, up to `max_pages` pages.
    pub async fn scrape_category(&self, category: &str, max_pages: u32) -> Vec<JobStub> {
        info!(category, max_pages, "Processing category");

        let mut crawl = self.crawl(category, max_pages);
        let mut stubs = Vec::new();
        while let Some(page_stubs) = crawl.next_page().await {
            stubs.extend(page_stubs);
        }

        info!(category, jobs = stubs.len(), "Category done");
        stubs
    }

    /// Fetch the detail page of a stub and build the full listing.
    ///
    /// Transient failures are retried with backoff; the last error is
    /// returned once the budget is spent.
    pub async fn fetch_listing(&self, stub: JobStub) -> Result<JobListing, FetchError> {
        let fetcher = self.fetcher.as_ref();
        let url = stub.url.as_str();

        let outcome = retry_with_backoff(
            self.retry,
            "description fetch",
            FetchError::is_retryable,
            || async move {
                let html = fetcher.fetch(url).await?;
                parse_description(&html).ok_or_else(|| FetchError::MissingElement {
                    url: url.to_string(),
                    element: "job description",
                })
            },
        )
        .await;

        match outcome {
            Ok(description) => {
                info!(url, title = %stub.title, "Description fetched");
                Ok(stub.into_listing(description))
            }
            Err(gave_up) => {
                warn!(
                    url,
                    category = %stub.category,
                    attempts = gave_up.attempts,
                    error = %gave_up.last,
                    "Failed to get description"
                );
                Err(gave_up.last)
            }
        }
    }

    async fn scrape_page(&self, category: &str, page: u32) -> Result<Vec<JobStub>, FetchError> {
        let url = self.search_url(category, page);
        info!(category, page, url = %url, "Scraping result page");

        let html = self.fetcher.fetch(&url).await?;
        let stubs = parse_listing_page(&html, &self.base_url, category, page);

        info!(category, page, jobs = stubs.len(), "Extracted job listings");
        Ok(stubs)
    }
}

/// Page-by-page iteration over one category's search results.
///
/// Ends at the page limit, at the first empty page, or at the first page
/// that fails to load.
pub struct CategoryCrawl<'a> {
    scraper: &'a JobScraper,
    category: String,
    next_page: u32,
    max_pages: u32,
    finished: bool,
}

impl CategoryCrawl<'_> {
    pub async fn next_page(&mut self) -> Option<Vec<JobStub>> {
        if self.finished || self.next_page > self.max_pages {
            self.finished = true;
            return None;
        }

        let page = self.next_page;
        if page > 1 {
            polite_pause(self.scraper.page_delay).await;
        }

        match self.scraper.scrape_page(&self.category, page).await {
            Ok(stubs) if stubs.is_empty() => {
                info!(category = %self.category, page, "No more results");
                self.finished = true;
                None
            }
            Ok(stubs) => {
                self.next_page += 1;
                Some(stubs)
            }
            Err(e) => {
                error!(
                    category = %self.category,
                    page,
                    error = %e,
                    "Error scraping page, ending category early"
                );
                self.finished = true;
                None
            }
        }
    }
}

/// Extract listing stubs from a search result page.
///
/// Cards missing a title, link or company are skipped.
pub fn parse_listing_page(html: &str, base_url: &Url, category: &str, page: u32) -> Vec<JobStub> {
    let document = Html::parse_document(html);
    let Ok(card_selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .filter_map(|card| match parse_card(card, base_url, category, page) {
            Some(stub) => Some(stub),
            None => {
                warn!(category, page, "Error extracting basic job info, skipping card");
                None
            }
        })
        .collect()
}

fn parse_card(card: ElementRef<'_>, base_url: &Url, category: &str, page: u32) -> Option<JobStub> {
    let title = first_text(card, &[TITLE_SELECTOR])?;
    let href = URL_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        card.select(&selector).next()?.value().attr("href")
    })?;
    let url = base_url.join(href.trim()).ok()?.to_string();
    let company = first_text(card, &[COMPANY_SELECTOR])?;
    let location = first_text(card, &[LOCATION_SELECTOR]).unwrap_or_default();

    Some(JobStub {
        title,
        company,
        location,
        url,
        category: category.to_string(),
        page,
    })
}

/// Description text of a posting detail page, one text block per line.
pub fn parse_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(DESCRIPTION_SELECTOR).ok()?;
    let element = document.select(&selector).next()?;

    let text = element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(scope: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = scope.select(&selector).next() {
                let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}
