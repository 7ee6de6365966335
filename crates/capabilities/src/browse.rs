//! Browse capability — stub page fetcher.
//!
//! Returns a canned summary for any URL. Failures are reported as text so
//! the model can see them and correct course in the next turn.

use async_trait::async_trait;
use promptweave_core::Capability;
use tracing::debug;

pub struct BrowseCapability;

#[async_trait]
impl Capability for BrowseCapability {
    fn name(&self) -> &str {
        "Browse"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return a short summary of its content."
    }

    fn input_shape(&self) -> &str {
        "The URL of the page to fetch."
    }

    async fn invoke(&self, input: &str) -> String {
        let url = input.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return format!("Could not fetch '{url}': not a valid URL.");
        }
        debug!(url, "browsing page");
        format!(
            "URL: {url}\nSummary: The page could not be fully rendered in this environment. \
             Use Search for an overview of the topic instead.\n"
        )
    }
}
