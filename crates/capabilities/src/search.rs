//! Search capability — stub that returns mock search results.
//!
//! In production this would call a real search API (Brave, Google, etc.).
//! The stub returns plausible results so the control loop can be exercised
//! end-to-end without network access.

use async_trait::async_trait;
use promptweave_core::Capability;
use tracing::debug;

pub struct SearchCapability;

#[async_trait]
impl Capability for SearchCapability {
    fn name(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, links, and snippets."
    }

    fn input_shape(&self) -> &str {
        "The search query."
    }

    async fn invoke(&self, input: &str) -> String {
        debug!(query = input, "running search");
        render_results(&mock_results(input, 3))
    }
}

struct SearchHit {
    title: String,
    link: String,
    snippet: String,
}

fn render_results(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        out.push_str(&format!(
            "Title: {}\nLink: {}\nSnippet: {}\n",
            hit.title, hit.link, hit.snippet
        ));
    }
    out
}

fn mock_results(query: &str, count: usize) -> Vec<SearchHit> {
    let q = query.to_lowercase();

    // Context-aware mock results for common topics.
    if q.contains("rust") {
        return vec![
            SearchHit {
                title: "The Rust Programming Language".into(),
                link: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchHit {
                title: "Rust by Example".into(),
                link: "https://doc.rust-lang.org/rust-by-example/".into(),
                snippet: "A collection of runnable examples that illustrate Rust concepts and standard library usage.".into(),
            },
            SearchHit {
                title: "crates.io: Rust Package Registry".into(),
                link: "https://crates.io/".into(),
                snippet: "The Rust community's crate registry for sharing and discovering Rust libraries.".into(),
            },
        ];
    }
    if q.contains("weather") {
        return vec![
            SearchHit {
                title: "Weather Forecast - National Weather Service".into(),
                link: "https://weather.gov/".into(),
                snippet: "Current conditions and forecasts for locations across the United States.".into(),
            },
            SearchHit {
                title: "OpenWeatherMap".into(),
                link: "https://openweathermap.org/".into(),
                snippet: "Free weather API providing current weather data and forecasts for any location.".into(),
            },
        ];
    }

    // Generic fallback.
    (0..count)
        .map(|i| SearchHit {
            title: format!("Result {} for: {}", i + 1, query),
            link: format!("https://example.com/search?q={}&p={}", query.replace(' ', "+"), i + 1),
            snippet: format!(
                "This is a mock search result for the query '{query}'. In production, this would contain real content."
            ),
        })
        .collect()
}
