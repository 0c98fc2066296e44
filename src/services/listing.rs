//! Search listing adapter.
//!
//! Parsing a result page into candidates is the only place that knows the
//! site's markup. Everything downstream works on [`CandidateResult`].

use crate::models::candidate::CandidateResult;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Candidates parsed from one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub candidates: Vec<CandidateResult>,
    /// Whether the page links to a next page.
    pub has_next: bool,
}

/// Turns listing HTML into candidates.
pub trait ListingParser: Send + Sync {
    /// Parse a page. Links are made absolute against `base_url`.
    fn parse(&self, html: &str, base_url: &str) -> ListingPage;
}

static VIDEO_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.video--link"));
static VIDEO_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h3.video__title"));
static VIDEO_SIZE: LazyLock<Selector> = LazyLock::new(|| selector("div.video__tag--size"));
static VIDEO_TIME: LazyLock<Selector> = LazyLock::new(|| selector("div.video__tag--time"));
static NEXT_PAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[title="Zobrazit další"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Listing markup of prehraj.to.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrehrajtoListing;

impl ListingParser for PrehrajtoListing {
    fn parse(&self, html: &str, base_url: &str) -> ListingPage {
        let document = Html::parse_document(html);

        let candidates = document
            .select(&VIDEO_LINK)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href").filter(|h| !h.trim().is_empty())?;
                let title = first_text(&anchor, &VIDEO_TITLE)?;
                if title.is_empty() {
                    return None;
                }
                Some(CandidateResult::new(
                    title,
                    absolute_url(base_url, href),
                    first_text(&anchor, &VIDEO_SIZE).unwrap_or_default(),
                    first_text(&anchor, &VIDEO_TIME).unwrap_or_default(),
                ))
            })
            .collect();

        ListingPage {
            candidates,
            has_next: document.select(&NEXT_PAGE).next().is_some(),
        }
    }
}

/// Trimmed text of the first descendant matching `sel`.
fn first_text(element: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    element
        .select(sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
}

/// Resolve a site link against the base URL.
///
/// Absolute links are kept; anything else is treated as a path on the site.
pub fn absolute_url(base_url: &str, link: &str) -> String {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        link.trim_start_matches('/')
    )
}
