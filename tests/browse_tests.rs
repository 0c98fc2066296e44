//! Integration tests for TMDB browse listings against a mock API.

use playto::core::browse::BrowseService;
use playto::core::cache::JsonCache;
use playto::models::meta::MediaKind;
use playto::services::tmdb::{BrowseList, BrowseMedia, TmdbClient};
use playto::Error;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer, temp: &TempDir) -> BrowseService {
    let tmdb = TmdbClient::new("key", "cs-CZ").with_base_url(server.uri());
    BrowseService::new(tmdb, JsonCache::new(temp.path().join("cache")), 24)
}

// ========== LISTING TESTS ==========

#[tokio::test]
async fn test_listing_is_filtered_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .and(query_param("sort_by", "popularity.desc"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "page": 2,
            "total_pages": 40,
            "results": [
                { "id": 70523, "name": "Dark", "original_language": "de", "first_air_date": "2017-12-01" },
                { "id": 1, "name": "Naruto", "original_language": "ja", "first_air_date": "2002-10-03" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    let listing = service
        .list(BrowseList::Discover, BrowseMedia::Tv, 2, false)
        .await
        .unwrap();
    assert_eq!(listing.page, 2);
    assert_eq!(listing.total_pages, 40);
    assert_eq!(listing.results.len(), 1);
    assert_eq!(listing.results[0].media_type, "tv");
    assert_eq!(listing.results[0].label(), "[TV] Dark (2017)");

    let cached = service
        .list(BrowseList::Discover, BrowseMedia::Tv, 2, false)
        .await
        .unwrap();
    assert_eq!(cached.results[0].id, 70523);
}

#[tokio::test]
async fn test_refresh_skips_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "id": 603, "media_type": "movie", "title": "The Matrix", "original_language": "en", "release_date": "1999-03-30" },
                { "id": 287, "media_type": "person", "name": "Brad Pitt", "original_language": "en" }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    for refresh in [false, true] {
        let listing = service
            .list(BrowseList::Trending, BrowseMedia::Movie, 1, refresh)
            .await
            .unwrap();
        assert_eq!(listing.page, 1);
        let ids: Vec<u64> = listing.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![603]);
    }
}

#[tokio::test]
async fn test_genre_and_year_listings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "18"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .and(query_param("first_air_date_year", "2020"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    let genre = service
        .list(BrowseList::Genre(18), BrowseMedia::Movie, 1, false)
        .await
        .unwrap();
    assert!(genre.results.is_empty());

    let year = service
        .list(BrowseList::Year(2020), BrowseMedia::Tv, 1, false)
        .await
        .unwrap();
    assert!(year.results.is_empty());
}

#[tokio::test]
async fn test_listing_for_wrong_media_type_is_rejected() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    let result = service
        .list(BrowseList::NowPlaying, BrowseMedia::Tv, 1, false)
        .await;
    assert!(matches!(result, Err(Error::TmdbListUnsupported { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/tv/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "genres": [ { "id": 18, "name": "Drama" }, { "id": 9648, "name": "Mystery" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    let genres = service.genres(BrowseMedia::Tv).await.unwrap();
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[1].name, "Mystery");
    assert_eq!(service.genres(BrowseMedia::Tv).await.unwrap(), genres);
}

// ========== SHOW TESTS ==========

#[tokio::test]
async fn test_show_seasons_and_episodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tv/70523"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 70523,
            "name": "Dark",
            "first_air_date": "2017-12-01",
            "overview": "A missing child.",
            "genres": [ { "id": 18, "name": "Drama" } ],
            "seasons": [
                { "season_number": 0, "name": "Specials", "episode_count": 2 },
                { "season_number": 1, "name": "Season 1", "episode_count": 10, "air_date": "2017-12-01" },
                { "season_number": 2, "name": "Season 2", "episode_count": 8, "air_date": "2019-06-21" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/70523/season/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "season_number": 1,
            "episodes": [
                { "name": "Secrets", "episode_number": 1, "overview": "" },
                { "name": "Lies", "episode_number": 2, "overview": "Ep two.", "vote_average": 7.9 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let service = service(&server, &temp);

    let show = service.show(70523).await.unwrap();
    let seasons: Vec<u32> = show.regular_seasons().map(|s| s.season_number).collect();
    assert_eq!(seasons, vec![1, 2]);

    let episodes = service.season(70523, 1).await.unwrap();
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].media_type, MediaKind::Episode);
    assert_eq!(episodes[0].plot, "A missing child.");
    assert_eq!(episodes[0].genres, vec!["Drama"]);
    assert_eq!(episodes[1].title, "Lies");
    assert_eq!(episodes[1].rating, Some(7.9));
    assert_eq!(episodes[1].source_query(), "Dark S01E02");

    assert_eq!(service.season(70523, 1).await.unwrap(), episodes);
}
