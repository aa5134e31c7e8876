//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full seed, crawl and complete cycle end-to-end.

use crawl_frontier::config::{
    BatchConfig, Config, EnqueueConfig, FetchConfig, FrontierConfig, SeedConfig, UserAgentConfig,
};
use crawl_frontier::crawler::{run_crawl, Coordinator, VisitOutcome};
use crawl_frontier::output::load_statistics;
use crawl_frontier::state::{Outcome, Resolution, MAX_HOPS};
use crawl_frontier::storage::{FrontierStore, SqliteFrontier};
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the given database
fn create_test_config(db_path: &str, max_rounds: u32) -> Config {
    Config {
        frontier: FrontierConfig {
            database_path: db_path.to_string(),
            max_hops: MAX_HOPS,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        batch: BatchConfig {
            parallel_urls_to_sync: 3,
            page_size: 2,
        },
        enqueue: EnqueueConfig { group_size: 4 },
        seeds: SeedConfig {
            url_field: "url".to_string(),
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            max_rounds,
        },
    }
}

fn in_memory_coordinator(max_rounds: u32) -> (Arc<SqliteFrontier>, Coordinator) {
    let store = Arc::new(SqliteFrontier::open_in_memory().expect("Failed to open store"));
    let coordinator = Coordinator::new(create_test_config(":memory:", max_rounds), store.clone())
        .expect("Failed to create coordinator");
    (store, coordinator)
}

/// Mounts a site with one page of each kind the crawler must handle
async fn mount_site(server: &MockServer) {
    let landing = format!("{}/landing", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", landing.as_str()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirect_chain_is_recorded() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let (store, coordinator) = in_memory_coordinator(0);
    let url = format!("{}/moved", server.uri());
    coordinator.enqueuer().queue_one(&url).await;

    let results = coordinator.run_round().await.unwrap();
    assert_eq!(
        results,
        vec![(url.clone(), VisitOutcome::Resolved { final_status: 200 })]
    );

    let entry = store.get(&url).await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 200 });
    assert_eq!(
        entry.hops.iter().map(|h| h.status).collect::<Vec<_>>(),
        vec![301, 200]
    );
    assert_eq!(
        entry.hops[0].redirect_target,
        Some(format!("{}/landing", server.uri()))
    );
}

#[tokio::test]
async fn test_missing_page_resolves_not_found() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let (store, coordinator) = in_memory_coordinator(0);
    let url = format!("{}/missing", server.uri());
    coordinator.enqueuer().queue_one(&url).await;

    coordinator.run().await.unwrap();

    let entry = store.get(&url).await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 404 });
    assert_eq!(entry.outcome(MAX_HOPS), Some(Outcome::NotFound));
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .expect(MAX_HOPS as u64)
        .mount(&server)
        .await;

    let (store, coordinator) = in_memory_coordinator(0);
    let url = format!("{}/loop", server.uri());
    coordinator.enqueuer().queue_one(&url).await;

    let summary = coordinator.run().await.unwrap();
    assert!(summary.exhausted);
    assert_eq!(summary.rounds, 1);

    let entry = store.get(&url).await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 302 });
    assert_eq!(entry.hops.len(), MAX_HOPS as usize);
    assert_eq!(entry.outcome(MAX_HOPS), Some(Outcome::HopBudgetExhausted));
}

#[tokio::test]
async fn test_persistent_error_exhausts_budget_across_rounds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(MAX_HOPS as u64)
        .mount(&server)
        .await;

    let (store, coordinator) = in_memory_coordinator(0);
    let url = format!("{}/broken", server.uri());
    coordinator.enqueuer().queue_one(&url).await;

    let summary = coordinator.run().await.unwrap();
    assert!(summary.exhausted);
    assert_eq!(summary.rounds, MAX_HOPS);
    assert_eq!(summary.still_pending, (MAX_HOPS - 1) as u64);

    let entry = store.get(&url).await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 500 });
    assert_eq!(entry.hops.len(), MAX_HOPS as usize);
}

#[tokio::test]
async fn test_max_rounds_leaves_frontier_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (store, coordinator) = in_memory_coordinator(2);
    let url = format!("{}/unavailable", server.uri());
    coordinator.enqueuer().queue_one(&url).await;

    let summary = coordinator.run().await.unwrap();
    assert!(!summary.exhausted);
    assert_eq!(summary.rounds, 2);

    let entry = store.get(&url).await.unwrap().unwrap();
    assert!(entry.resolution.is_pending());
    assert_eq!(entry.hops.len(), 2);
    assert!(!coordinator.complete().await.unwrap());
}

#[tokio::test]
async fn test_full_crawl_from_seed_file() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base_url = server.uri();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("frontier.db");
    let seed_path = dir.path().join("seeds.csv");

    let mut seeds = std::fs::File::create(&seed_path).unwrap();
    write!(
        seeds,
        "url,label\r\n{0}/,home\r\n{0}/moved,moved\r\n{0}/missing,missing\r\n{0}/loop,loop\r\n,orphan\r\n{0}/,duplicate\r\n",
        base_url
    )
    .unwrap();
    seeds.flush().unwrap();

    let config = create_test_config(db_path.to_str().unwrap(), 0);

    let coordinator = Coordinator::open(config.clone()).expect("Failed to open coordinator");
    let report = coordinator.seed_from_file(&seed_path).await.unwrap();
    assert_eq!(report.inserted, 4);
    assert_eq!(report.already_known, 1);

    let summary = coordinator.run().await.unwrap();
    assert!(summary.exhausted);
    // Four URLs, three per batch
    assert_eq!(summary.rounds, 2);

    let stats = load_statistics(coordinator.store().as_ref(), MAX_HOPS)
        .await
        .unwrap();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.resolved, 4);
    assert_eq!(stats.outcome_count(Outcome::Ok), 2);
    assert_eq!(stats.outcome_count(Outcome::NotFound), 1);
    assert_eq!(stats.outcome_count(Outcome::HopBudgetExhausted), 1);

    assert!(coordinator.complete().await.unwrap());
    assert_eq!(
        coordinator.store().count_by_resolution().await.unwrap().total(),
        0
    );
}

#[tokio::test]
async fn test_run_crawl_tears_down_on_completion() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("frontier.db");
    let config = create_test_config(db_path.to_str().unwrap(), 0);

    {
        let store = SqliteFrontier::open(&db_path).unwrap();
        store
            .put(&crawl_frontier::FrontierEntry::pending(format!("{}/", server.uri())))
            .await
            .unwrap();
    }

    let summary = run_crawl(config).await.unwrap();
    assert!(summary.exhausted);
    assert_eq!(summary.visits, 1);

    let store = SqliteFrontier::open(&db_path).unwrap();
    assert_eq!(store.count_by_resolution().await.unwrap().total(), 0);
}

#[tokio::test]
async fn test_unreachable_urls_do_not_starve_live_ones() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let (store, coordinator) = in_memory_coordinator(0);
    // Port 1 refuses connections; these sort ahead of the mock server's URL
    // and fill the first batch of three
    let dead = ["http://127.0.0.1:1/a", "http://127.0.0.1:1/b", "http://127.0.0.1:1/c"];
    let live = format!("{}/", server.uri());
    coordinator.enqueuer().queue_many(&dead).await;
    coordinator.enqueuer().queue_one(&live).await;

    let first = coordinator.reader().read_unresolved(3).await.unwrap();
    assert_eq!(first, dead.iter().map(|u| u.to_string()).collect::<Vec<_>>());

    let summary = coordinator.run().await.unwrap();
    assert!(!summary.exhausted);
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.resolved, 1);

    let entry = store.get(&live).await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 200 });

    for url in dead {
        let entry = store.get(url).await.unwrap().unwrap();
        assert!(entry.resolution.is_pending());
        assert!(entry.hops.is_empty());
    }
    assert!(!coordinator.complete().await.unwrap());
}
