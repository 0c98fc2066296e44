//! Integration tests for listing scrapes against a mock site.
//!
//! Tests cover:
//! - Search pagination and early termination
//! - Failed pages
//! - Most-watched dedup and caching

use playto::core::cache::JsonCache;
use playto::core::most_watched::{ListingSource, MostWatchedService};
use playto::core::scraper::scrape_search;
use playto::models::config::{MostWatchedCategory, MostWatchedConfig, SiteConfig};
use playto::services::listing::PrehrajtoListing;
use playto::services::prehrajto::PrehrajtoClient;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_page(ids: &[&str], has_next: bool) -> String {
    let mut html = String::from("<html><body>");
    for id in ids {
        html.push_str(&format!(
            r#"<a class="video--link" href="/video-{id}/{id}">
                 <h3 class="video__title">Video {id}</h3>
                 <div class="video__tag--size">1 GB</div>
                 <div class="video__tag--time">1:00:00</div>
               </a>"#
        ));
    }
    if has_next {
        html.push_str(r#"<a title="Zobrazit další" href="?vp-page=2">Další</a>"#);
    }
    html.push_str("</body></html>");
    html
}

fn client(server: &MockServer) -> PrehrajtoClient {
    let config = SiteConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    PrehrajtoClient::new(&config).unwrap()
}

// ========== SEARCH TESTS ==========

#[tokio::test]
async fn test_search_stops_when_limit_reached() {
    let server = MockServer::start().await;
    let ids: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&ids, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["x"], false)))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = scrape_search(&client(&server), &PrehrajtoListing, "dark", 5, 10).await;

    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(outcome.candidates.len(), 12);
    assert!(!outcome.interrupted);
}

#[tokio::test]
async fn test_search_follows_next_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a", "b"], true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["c"], false)))
        .mount(&server)
        .await;

    let outcome = scrape_search(&client(&server), &PrehrajtoListing, "dark", 5, 56).await;

    assert_eq!(outcome.pages_fetched, 2);
    let titles: Vec<_> = outcome.candidates.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Video a", "Video b", "Video c"]);
    assert!(outcome.candidates[0].link.starts_with(&server.uri()));
}

#[tokio::test]
async fn test_search_respects_max_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a"], true)))
        .expect(2)
        .mount(&server)
        .await;

    let outcome = scrape_search(&client(&server), &PrehrajtoListing, "dark", 2, 56).await;
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.candidates.len(), 2);
}

#[tokio::test]
async fn test_search_first_page_failure_gives_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = scrape_search(&client(&server), &PrehrajtoListing, "dark", 3, 56).await;
    assert!(outcome.candidates.is_empty());
    assert!(!outcome.interrupted);
}

#[tokio::test]
async fn test_search_keeps_pages_before_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a", "b"], true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hledej/dark"))
        .and(query_param("vp-page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = scrape_search(&client(&server), &PrehrajtoListing, "dark", 3, 56).await;
    assert_eq!(outcome.candidates.len(), 2);
    assert_eq!(outcome.pages_fetched, 2);
}

#[tokio::test]
async fn test_search_unreachable_site_is_interrupted() {
    let config = SiteConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: 2,
        ..Default::default()
    };
    let client = PrehrajtoClient::new(&config).unwrap();

    let outcome = scrape_search(&client, &PrehrajtoListing, "dark", 3, 56).await;
    assert!(outcome.candidates.is_empty());
    assert!(outcome.interrupted);
}

// ========== MOST WATCHED TESTS ==========

async fn mount_most_watched(server: &MockServer) {
    // Page-specific mocks take precedence over the bare page-1 path.
    Mock::given(method("GET"))
        .and(path("/nejsledovanejsi-online-videa-7-dni"))
        .and(query_param("vp-page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["b", "c"], true)))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nejsledovanejsi-online-videa-7-dni"))
        .and(query_param("vp-page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], false)))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nejsledovanejsi-online-videa-7-dni"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a", "b"], true)))
        .with_priority(5)
        .mount(server)
        .await;
}

fn most_watched_config(max_pages: u32) -> MostWatchedConfig {
    MostWatchedConfig {
        category: MostWatchedCategory::Days7,
        max_pages,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_most_watched_dedups_and_stops_on_empty_page() {
    let server = MockServer::start().await;
    mount_most_watched(&server).await;
    let temp = TempDir::new().unwrap();
    let client = client(&server);

    let service = MostWatchedService::new(&client, JsonCache::new(temp.path()), most_watched_config(5));
    let mut pages = Vec::new();
    let listing = service.load(false, |p| pages.push(p)).await;

    let titles: Vec<_> = listing.items.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Video a", "Video b", "Video c"]);
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(listing.source, ListingSource::Site);
    assert!(!listing.interrupted);
}

#[tokio::test]
async fn test_most_watched_is_cached() {
    let server = MockServer::start().await;
    mount_most_watched(&server).await;
    let temp = TempDir::new().unwrap();
    let client = client(&server);
    let service = MostWatchedService::new(&client, JsonCache::new(temp.path()), most_watched_config(2));

    let first = service.load(false, |_| {}).await;
    assert_eq!(first.source, ListingSource::Site);
    assert!(temp.path().join("most_watched_7d_2.json").exists());

    let second = service.load(false, |_| {}).await;
    assert_eq!(second.source, ListingSource::Cache);
    assert_eq!(second.items, first.items);

    let refreshed = service.load(true, |_| {}).await;
    assert_eq!(refreshed.source, ListingSource::Site);

    assert_eq!(service.clear().unwrap(), 1);
}

#[tokio::test]
async fn test_most_watched_failure_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nejsledovanejsi-online-videa-7-dni"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let client = client(&server);
    let service = MostWatchedService::new(&client, JsonCache::new(temp.path()), most_watched_config(2));

    let listing = service.load(false, |_| {}).await;
    assert!(listing.items.is_empty());
    assert!(listing.interrupted);
    assert!(!temp.path().join("most_watched_7d_2.json").exists());
}

#[tokio::test]
async fn test_most_watched_cache_can_be_disabled() {
    let server = MockServer::start().await;
    mount_most_watched(&server).await;
    let temp = TempDir::new().unwrap();
    let client = client(&server);
    let config = MostWatchedConfig {
        disable_cache: true,
        ..most_watched_config(2)
    };
    let service = MostWatchedService::new(&client, JsonCache::new(temp.path()), config);

    service.load(false, |_| {}).await;
    let second = service.load(false, |_| {}).await;
    assert_eq!(second.source, ListingSource::Site);
    assert!(!temp.path().join("most_watched_7d_2.json").exists());
}
