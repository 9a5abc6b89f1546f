use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::SiteScrapeConfig;
use crate::domain::{RawListing, SourceMethod, SourceSite};
use crate::error::Result;
use crate::observability::metrics;
use crate::sources::scrapers::{
    absolutize, paged_url, CARD_CASH_FLOW_RE, CARD_PRICE_RE, SCRAPE_USER_AGENT,
};
use crate::sources::ListingSource;

const BASE_URL: &str = "https://www.bizbuysell.com";

/// Scraper for BizBuySell search result pages.
pub struct BizBuySellScraper {
    client: reqwest::Client,
    config: SiteScrapeConfig,
}

impl BizBuySellScraper {
    pub fn new(config: SiteScrapeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn parse_cards(&self, body: &str) -> Vec<RawListing> {
        let document = Html::parse_document(body);
        let card_selector =
            Selector::parse("div.listing-item, div.business-card, div.result-item, article")
                .unwrap();

        let mut listings = Vec::new();
        for card in document.select(&card_selector) {
            if let Some(listing) = self.parse_card(&card) {
                listings.push(listing);
            }
        }
        listings
    }

    /// One result card to one raw listing; cards without a name and deep link
    /// are navigation chrome, not listings.
    fn parse_card(&self, card: &ElementRef) -> Option<RawListing> {
        let title_selector = Selector::parse("h3, h2, a.title").unwrap();
        let link_selector = Selector::parse("a[href]").unwrap();
        let location_selector = Selector::parse(".location, .listing-location").unwrap();

        let name = card
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())?;
        let href = card
            .select(&link_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| absolutize(BASE_URL, href))?;

        let text = card.text().collect::<Vec<_>>().join(" ");
        let price = CARD_PRICE_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let cash_flow = CARD_CASH_FLOW_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let address = card
            .select(&location_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        debug!(%name, %href, ?price, "parsed listing card");
        Some(RawListing {
            name,
            address,
            source_site: SourceSite::BizBuySell,
            source_method: SourceMethod::WebScrape,
            source_url: href,
            price: price.map(|v| json!(v)),
            cash_flow: cash_flow.map(|v| json!(v)),
            ..RawListing::default()
        })
    }
}

#[async_trait]
impl ListingSource for BizBuySellScraper {
    fn site(&self) -> SourceSite {
        SourceSite::BizBuySell
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListing>> {
        let mut listings = Vec::new();

        for page in 1..=self.config.max_pages {
            let page_url = paged_url(&self.config.search_url, page);
            debug!(%page_url, "fetching BizBuySell result page");

            let response = self
                .client
                .get(&page_url)
                .header(reqwest::header::USER_AGENT, SCRAPE_USER_AGENT)
                .send()
                .await
                .and_then(|resp| resp.error_for_status());
            let body = match response {
                Ok(resp) => resp.text().await?,
                Err(e) => {
                    metrics::sources::fetch_error();
                    return Err(e.into());
                }
            };

            let page_listings = self.parse_cards(&body);
            if page_listings.is_empty() {
                warn!(page, "no listings found, stopping pagination");
                break;
            }
            listings.extend(page_listings);

            // Respectful delay between result pages.
            tokio::time::sleep(std::time::Duration::from_secs(self.config.delay_seconds)).await;
        }

        metrics::sources::listings_fetched(listings.len());
        info!(count = listings.len(), "BizBuySell scraping complete");
        Ok(listings)
    }
}
