//! Integration tests for series scans against a mock site.

use playto::core::series::{scan_series, SeriesStore};
use playto::models::candidate::Quality;
use playto::models::config::SiteConfig;
use playto::services::listing::PrehrajtoListing;
use playto::services::prehrajto::PrehrajtoClient;
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_page(items: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (id, title) in items {
        html.push_str(&format!(
            r#"<a class="video--link" href="/video/{id}">
                 <h3 class="video__title">{title}</h3>
                 <div class="video__tag--size">1.2 GB</div>
                 <div class="video__tag--time">52:00</div>
               </a>"#
        ));
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

fn store(temp: &TempDir) -> SeriesStore {
    SeriesStore::new(temp.path().join("series"), temp.path().join("watched"))
}

#[tokio::test]
async fn test_scan_files_best_source_per_episode() {
    let server = MockServer::start().await;
    let page = listing_page(&[
        ("a1", "Dark S01E01 720p CZ"),
        ("a2", "Dark S01E01 1080p CZ"),
        ("a3", "Dark 1x02 CZ titulky"),
        ("a4", "Dark S01E03 2160p"),
        ("a5", "Darkness (2019) film"),
        ("a6", "Other Show S01E05"),
        ("a7", "Dark S02E01"),
    ]);
    Mock::given(method("GET"))
        .and(path_regex(r"^/hledej/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(4)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    let data = scan_series(&client(&server), &PrehrajtoListing, &store, "Dark")
        .await
        .unwrap();

    assert_eq!(data.name, "DARK");
    assert_eq!(data.episode_count(), 3);

    let first = &data.seasons[&1][&1];
    assert_eq!(first.ident, format!("{}/video/a2", server.uri()));
    assert_eq!(first.quality, Quality::P1080);
    assert_eq!(first.size, "1.2 GB");
    assert_eq!(data.seasons[&1][&2].name, "Dark 1x02 CZ titulky");
    assert!(!data.seasons[&1].contains_key(&3));
    assert_eq!(data.seasons[&2][&1].ident, format!("{}/video/a7", server.uri()));

    assert_eq!(store.load("Dark").unwrap(), Some(data));
    assert_eq!(store.list().unwrap()[0].name, "DARK");
}

#[tokio::test]
async fn test_scan_survives_failed_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/hledej/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    let data = scan_series(&client(&server), &PrehrajtoListing, &store, "Dark")
        .await
        .unwrap();

    assert!(data.seasons.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_rescan_replaces_stored_episodes_and_keeps_watched_marks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/hledej/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&[("b1", "Dark S03E08")])),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    store.mark_watched("Dark", 1, 1).unwrap();

    let data = scan_series(&client(&server), &PrehrajtoListing, &store, "Dark")
        .await
        .unwrap();

    assert_eq!(data.seasons.keys().copied().collect::<Vec<_>>(), vec![3]);
    assert!(store.is_watched("Dark", 1, 1).unwrap());
}
