pub mod content;
pub mod fetcher;
pub mod page;

use log::{info, warn};

use crate::{analysis::fetcher::PageFetcher, error::AppResult, schema::QuickCheckReport};

/// Fetches `url` and scores the returned HTML. Error pages are scored too.
pub async fn quick_check(fetcher: &PageFetcher, url: &str) -> AppResult<QuickCheckReport> {
    let page = fetcher.fetch(url).await?;
    if !page.is_success() {
        warn!("{} answered with status {}, scoring the error page", url, page.status);
    }
    if page.final_url.trim_end_matches('/') != url.trim_end_matches('/') {
        info!("{} redirected to {}", url, page.final_url);
    }
    Ok(page::analyze_page(url, &page.html, page.load_time_ms))
}
