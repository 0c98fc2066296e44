//! CSFD client: daily TV tips and film detail pages.

use crate::models::tip::{FilmDetail, TipRef};
use crate::{Error, Result};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const CSFD_BASE_URL: &str = "https://www.csfd.cz";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

/// Tips section candidates, most specific first.
const SECTION_SELECTORS: &[&str] = &[
    "section#tv-tip",
    "div.box.box-tv-tip",
    "div.tv-tips-container",
    "div.tv-tip-box",
    "section.tv-tips",
    "div.box-content.tv-tips",
    r#"div[class*="tip"], div[class*="tv"]"#,
    r#"section[class*="tip"], section[class*="tv"]"#,
];

/// Tip article candidates inside the section.
const ARTICLE_SELECTORS: &[&str] = &[
    "article.article",
    "div.tip-item",
    "li.tv-tip-item",
    "div.film-item",
    r#"div[class*="item"], div[class*="tip"]"#,
    r#"li[class*="item"], li[class*="tip"]"#,
];

static FILM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/film/(\d+)-").expect("static pattern"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2})").expect("static pattern"));
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})").expect("static pattern"));

static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.film-title-name"));
static TIP_TIME: LazyLock<Selector> = LazyLock::new(|| selector("span.tv-tip-time"));
static CHANNEL_IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static CHANNEL_SPAN: LazyLock<Selector> = LazyLock::new(|| selector(r#"span[class*="channel"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static ORIGIN: LazyLock<Selector> = LazyLock::new(|| selector("div.origin"));
static RATING: LazyLock<Selector> = LazyLock::new(|| selector("div.film-rating-average"));
static GENRES: LazyLock<Selector> = LazyLock::new(|| selector("div.genres a"));
static PLOT: LazyLock<Selector> = LazyLock::new(|| selector("div.plot-full"));
static FILM_NAMES: LazyLock<Selector> = LazyLock::new(|| selector("ul.film-names li"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// CSFD HTTP client.
#[derive(Debug, Clone)]
pub struct CsfdClient {
    base_url: String,
    client: reqwest::Client,
}

impl CsfdClient {
    /// Create a client with browser-like headers and a 30 s timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(CSFD_BASE_URL)
    }

    /// Create a client against another site root.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("cs-CZ,cs;q=0.8,en-US;q=0.5,en;q=0.3"),
        );
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", base_url)) {
            headers.insert(REFERER, referer);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { base_url, client })
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::CsfdRequest(format!("HTTP {} for {}", status.as_u16(), url)));
        }
        Ok(resp.text().await?)
    }

    /// Today's tip references.
    pub async fn fetch_tip_refs(&self) -> Result<Vec<TipRef>> {
        let html = self.get_html(&format!("{}/televize/", self.base_url)).await?;
        Ok(parse_tip_refs(&html))
    }

    /// Film detail without artwork.
    pub async fn fetch_detail(&self, id: &str) -> Result<FilmDetail> {
        let html = self
            .get_html(&format!("{}/film/{}/prehled", self.base_url, id))
            .await?;
        Ok(parse_detail(&html))
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse tip references from the TV page.
pub fn parse_tip_refs(html: &str) -> Vec<TipRef> {
    let document = Html::parse_document(html);

    let section = SECTION_SELECTORS
        .iter()
        .find_map(|css| document.select(&selector(css)).next());
    let Some(section) = section else {
        tracing::warn!("No TV tips section found");
        return Vec::new();
    };

    let articles: Vec<ElementRef<'_>> = ARTICLE_SELECTORS
        .iter()
        .map(|css| section.select(&selector(css)).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();
    if articles.is_empty() {
        tracing::warn!("No articles found in TV tips section");
        return Vec::new();
    }

    let mut tips = Vec::new();
    for article in articles {
        let Some(href) = article
            .select(&TITLE_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Some(id) = FILM_ID_RE.captures(href).map(|c| c[1].to_string()) else {
            tracing::debug!("No film id in {}", href);
            continue;
        };

        let mut time = None;
        let mut channel = None;
        if let Some(span) = article.select(&TIP_TIME).next() {
            time = TIME_RE
                .captures(&text_of(span))
                .map(|c| c[1].to_string());
            channel = match span.select(&CHANNEL_IMG).next() {
                Some(img) => img.value().attr("alt").map(|a| a.trim().to_string()),
                None => span.select(&CHANNEL_SPAN).next().map(text_of),
            }
            .filter(|c| !c.is_empty());
        }

        tips.push(TipRef { id, time, channel });
    }

    tracing::debug!("Found {} tip references", tips.len());
    tips
}

/// Parse a film detail page.
pub fn parse_detail(html: &str) -> FilmDetail {
    let document = Html::parse_document(html);
    let first = |sel: &Selector| document.select(sel).next();

    let title = first(&H1).map(text_of).filter(|t| !t.is_empty());
    let origin = first(&ORIGIN).map(|e| e.text().collect::<String>());
    let year = origin
        .as_deref()
        .and_then(|o| YEAR_RE.captures(o))
        .map(|c| c[1].to_string());
    let rating = first(&RATING).map(text_of).filter(|r| !r.is_empty());
    let genres = document.select(&GENRES).map(text_of).collect();
    let plot = first(&PLOT)
        .map(|e| e.text().collect::<String>())
        .and_then(|p| p.trim().lines().next().map(|l| l.trim().to_string()))
        .filter(|p| !p.is_empty());

    let original_title = match origin.as_deref() {
        Some(o) if !o.contains("Česko") => first(&FILM_NAMES).map(text_of),
        _ => None,
    }
    .filter(|t| !t.is_empty());

    FilmDetail {
        title,
        original_title,
        year,
        rating,
        genres,
        plot,
        poster: None,
        fanart: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIPS_PAGE: &str = r#"
        <html><body>
        <section id="tv-tip">
          <article class="article">
            <a class="film-title-name" href="/film/10135-pelisky/prehled/">Pelíšky</a>
            <span class="tv-tip-time">20:15 <img alt=" ČT1 " src="ct1.png"></span>
          </article>
          <article class="article">
            <a class="film-title-name" href="/tvurce/123-someone/">Not a film</a>
          </article>
          <article class="article">
            <a class="film-title-name" href="/film/8365-vratne-lahve/">Vratné lahve</a>
            <span class="tv-tip-time">9:05 <span class="channel-name">Nova</span></span>
          </article>
        </section>
        </body></html>
    "#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <h1> Forrest Gump </h1>
          <ul class="film-names"><li>Forrest Gump</li></ul>
          <div class="origin">USA, 1994, 142 min</div>
          <div class="film-rating-average">93%</div>
          <div class="genres"><a>Drama</a> / <a>Komedie</a></div>
          <div class="plot-full">
            Forrest Gump je prostý muž.
            (oficiální text distributora)
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_tip_refs() {
        let tips = parse_tip_refs(TIPS_PAGE);
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].id, "10135");
        assert_eq!(tips[0].time.as_deref(), Some("20:15"));
        assert_eq!(tips[0].channel.as_deref(), Some("ČT1"));
        assert_eq!(tips[1].id, "8365");
        assert_eq!(tips[1].time.as_deref(), Some("9:05"));
        assert_eq!(tips[1].channel.as_deref(), Some("Nova"));
    }

    #[test]
    fn test_parse_tip_refs_without_section() {
        assert!(parse_tip_refs("<html><body><p>x</p></body></html>").is_empty());
    }

    #[test]
    fn test_parse_detail() {
        let detail = parse_detail(DETAIL_PAGE);
        assert_eq!(detail.title.as_deref(), Some("Forrest Gump"));
        assert_eq!(detail.year.as_deref(), Some("1994"));
        assert_eq!(detail.rating.as_deref(), Some("93%"));
        assert_eq!(detail.genres, vec!["Drama", "Komedie"]);
        assert_eq!(detail.plot.as_deref(), Some("Forrest Gump je prostý muž."));
        assert_eq!(detail.original_title.as_deref(), Some("Forrest Gump"));
    }

    #[test]
    fn test_czech_film_has_no_original_title() {
        let html = r#"<h1>Pelíšky</h1><ul class="film-names"><li>Cosy Dens</li></ul>
                      <div class="origin">Česko, 1999</div>"#;
        let detail = parse_detail(html);
        assert_eq!(detail.original_title, None);
        assert_eq!(detail.year.as_deref(), Some("1999"));
    }
}
