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

const BASE_URL: &str = "https://www.bizquest.com";

/// Scraper for BizQuest search result pages.
pub struct BizQuestScraper {
    client: reqwest::Client,
    config: SiteScrapeConfig,
}

impl BizQuestScraper {
    pub fn new(config: SiteScrapeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn parse_cards(&self, body: &str) -> Vec<RawListing> {
        let document = Html::parse_document(body);
        let card_selector =
            Selector::parse("div.listing, div.search-result, article").unwrap();

        document
            .select(&card_selector)
            .filter_map(|card| self.parse_card(&card))
            .collect()
    }

    fn parse_card(&self, card: &ElementRef) -> Option<RawListing> {
        let title_selector = Selector::parse("h3, h2, a.listing-title").unwrap();
        let link_selector = Selector::parse("a[href]").unwrap();
        let category_selector = Selector::parse(".category, .industry").unwrap();
        let location_selector = Selector::parse(".location, .listing-area").unwrap();

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
        let select_text = |selector: &Selector| {
            card.select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default()
        };

        debug!(%name, %href, "parsed listing card");
        Some(RawListing {
            name,
            address: select_text(&location_selector),
            source_site: SourceSite::BizQuest,
            source_method: SourceMethod::WebScrape,
            source_url: href,
            price: CARD_PRICE_RE
                .captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| json!(m.as_str())),
            cash_flow: CARD_CASH_FLOW_RE
                .captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| json!(m.as_str())),
            category: select_text(&category_selector),
            ..RawListing::default()
        })
    }
}

#[async_trait]
impl ListingSource for BizQuestScraper {
    fn site(&self) -> SourceSite {
        SourceSite::BizQuest
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListing>> {
        let mut listings = Vec::new();

        for page in 1..=self.config.max_pages {
            let page_url = paged_url(&self.config.search_url, page);
            debug!(%page_url, "fetching BizQuest result page");

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

            tokio::time::sleep(std::time::Duration::from_secs(self.config.delay_seconds)).await;
        }

        metrics::sources::listings_fetched(listings.len());
        info!(count = listings.len(), "BizQuest scraping complete");
        Ok(listings)
    }
}
