//! Integration tests for the frontier components
//!
//! These tests drive the enqueuer, batch reader and tracker against a shared
//! SQLite store, the way concurrent workers would.

use crawl_frontier::crawler::{
    BatchReader, EnqueueOutcome, Enqueuer, HopReport, Transition, VisitTracker,
};
use crawl_frontier::pagination::{paginate, Page, PageRequest};
use crawl_frontier::seeds::{parse_seed_table, seed_urls};
use crawl_frontier::state::{Outcome, Resolution, MAX_HOPS};
use crawl_frontier::storage::{FrontierStore, SqliteFrontier};
use crawl_frontier::FrontierError;
use std::sync::Arc;

struct Frontier {
    store: Arc<SqliteFrontier>,
    enqueuer: Enqueuer,
    reader: BatchReader,
    tracker: VisitTracker,
}

fn create_frontier(page_size: usize, max_batch: usize) -> Frontier {
    let store = Arc::new(SqliteFrontier::open_in_memory().expect("Failed to open store"));
    Frontier {
        enqueuer: Enqueuer::new(store.clone(), 20),
        reader: BatchReader::new(store.clone(), page_size, max_batch),
        tracker: VisitTracker::new(store.clone(), MAX_HOPS),
        store,
    }
}

#[tokio::test]
async fn test_enqueue_deduplicates() {
    let frontier = create_frontier(5, 10);

    frontier
        .enqueuer
        .queue_many(&["https://a", "https://b", "https://a"])
        .await;

    let counts = frontier.store.count_by_resolution().await.unwrap();
    assert_eq!(counts.total(), 2);
    assert_eq!(counts.pending, 2);

    for url in ["https://a", "https://b"] {
        let entry = frontier.store.get(url).await.unwrap().expect("entry exists");
        assert_eq!(entry.resolution, Resolution::Pending);
        assert!(entry.hops.is_empty());
    }
}

#[tokio::test]
async fn test_mark_visited_records_no_hops() {
    let frontier = create_frontier(5, 10);
    frontier.enqueuer.queue_one("https://a").await;

    frontier.tracker.mark_visited("https://a", 200).await.unwrap();

    let entry = frontier.store.get("https://a").await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 200 });
    assert!(entry.hops.is_empty());
}

#[tokio::test]
async fn test_redirect_chain_resolves_on_200() {
    let frontier = create_frontier(5, 10);
    frontier.enqueuer.queue_one("https://b").await;

    let reports = [
        HopReport::new(301, 0, Some("https://c".to_string())),
        HopReport::new(302, 1, Some("https://d".to_string())),
        HopReport::new(200, 2, None),
    ];

    let mut last = None;
    for report in reports {
        last = Some(frontier.tracker.record("https://b", report).await.unwrap());
    }

    assert_eq!(
        last,
        Some(Transition::Resolved {
            final_status: 200,
            outcome: Outcome::Ok
        })
    );

    let entry = frontier.store.get("https://b").await.unwrap().unwrap();
    assert_eq!(entry.resolution, Resolution::Resolved { final_status: 200 });
    assert_eq!(entry.final_status, Some(200));
    assert_eq!(entry.hops.len(), 3);
    assert_eq!(entry.hops[0].redirect_target.as_deref(), Some("https://c"));
    assert_eq!(entry.hops[1].redirect_target.as_deref(), Some("https://d"));

    // No further hops are accepted
    let after = frontier
        .tracker
        .record("https://b", HopReport::new(301, 3, None))
        .await
        .unwrap();
    assert_eq!(after, Transition::AlreadyResolved);
}

#[tokio::test]
async fn test_hop_budget_forces_resolution() {
    let frontier = create_frontier(5, 10);
    frontier.enqueuer.queue_one("https://e").await;

    for i in 0..MAX_HOPS {
        let transition = frontier
            .tracker
            .record("https://e", HopReport::new(301, i, Some("https://e".to_string())))
            .await
            .unwrap();

        let entry = frontier.store.get("https://e").await.unwrap().unwrap();
        if i < MAX_HOPS - 1 {
            assert!(matches!(transition, Transition::FollowRedirect { .. }));
            assert!(entry.resolution.is_pending());
        } else {
            assert_eq!(entry.resolution, Resolution::Resolved { final_status: 301 });
        }
    }

    let entry = frontier.store.get("https://e").await.unwrap().unwrap();
    assert_eq!(entry.hops.len(), MAX_HOPS as usize);
    assert_eq!(entry.outcome(MAX_HOPS), Some(Outcome::HopBudgetExhausted));
}

#[tokio::test]
async fn test_batch_is_capped_and_pending() {
    let frontier = create_frontier(5, 10);
    let urls: Vec<String> = (0..12).map(|i| format!("https://example.com/{:02}", i)).collect();
    frontier.enqueuer.queue_many(&urls).await;

    let batch = frontier.reader.read_unresolved(5).await.unwrap();
    assert_eq!(batch.len(), 5);

    for url in &batch {
        let entry = frontier.store.get(url).await.unwrap().unwrap();
        assert!(entry.resolution.is_pending());
    }
}

#[tokio::test]
async fn test_batch_never_exceeds_limit() {
    let frontier = create_frontier(5, 10);
    let urls: Vec<String> = (0..12).map(|i| format!("https://example.com/{:02}", i)).collect();
    frontier.enqueuer.queue_many(&urls).await;

    for limit in [0, 1, 4, 5, 6, 10, 11, 50] {
        let batch = frontier.reader.read_unresolved(limit).await.unwrap();
        assert!(batch.len() <= limit);
        assert!(batch.len() <= 10);
    }
}

#[tokio::test]
async fn test_sparse_seed_row_is_not_enqueued() {
    let frontier = create_frontier(5, 10);

    let rows = parse_seed_table("label,url\nhome,https://a.example/\nbroken\n");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].len(), 1);

    let urls = seed_urls(&rows, "url");
    let report = frontier.enqueuer.queue_many(&urls).await;
    assert_eq!(report.inserted, 1);

    let counts = frontier.store.count_by_resolution().await.unwrap();
    assert_eq!(counts.total(), 1);
}

#[tokio::test]
async fn test_concurrent_workers_enqueue_once() {
    let frontier = Arc::new(create_frontier(5, 10));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.enqueuer.queue_one("https://shared.example/").await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap();
        assert_ne!(outcome, EnqueueOutcome::Dropped);
    }

    let counts = frontier.store.count_by_resolution().await.unwrap();
    assert_eq!(counts.total(), 1);
    let entry = frontier.store.get("https://shared.example/").await.unwrap().unwrap();
    assert!(entry.resolution.is_pending());
    assert!(entry.hops.is_empty());
}

#[tokio::test]
async fn test_404_at_any_hop_resolves() {
    let frontier = create_frontier(5, 10);
    frontier.enqueuer.queue_one("https://gone").await;

    frontier
        .tracker
        .record("https://gone", HopReport::new(302, 0, Some("https://gone/x".to_string())))
        .await
        .unwrap();
    let transition = frontier
        .tracker
        .record("https://gone", HopReport::new(404, 1, None))
        .await
        .unwrap();

    assert_eq!(
        transition,
        Transition::Resolved {
            final_status: 404,
            outcome: Outcome::NotFound
        }
    );
    let entry = frontier.store.get("https://gone").await.unwrap().unwrap();
    assert_eq!(entry.hops.len(), 2);
}

#[tokio::test]
async fn test_skipped_hop_index_is_rejected() {
    let frontier = create_frontier(5, 10);
    frontier.enqueuer.queue_one("https://a").await;

    let err = frontier
        .tracker
        .record("https://a", HopReport::new(301, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, FrontierError::OutOfOrderHop { .. }));

    let entry = frontier.store.get("https://a").await.unwrap().unwrap();
    assert!(entry.hops.is_empty());
}

#[tokio::test]
async fn test_frontier_drains_to_exhaustion() {
    let frontier = create_frontier(2, 3);
    let urls: Vec<String> = (0..7).map(|i| format!("https://example.com/{}", i)).collect();
    frontier.enqueuer.queue_many(&urls).await;

    let mut rounds = 0;
    loop {
        let batch = frontier.reader.read_unresolved(3).await.unwrap();
        if batch.is_empty() {
            break;
        }
        rounds += 1;
        for url in batch {
            frontier.tracker.mark_visited(&url, 200).await.unwrap();
        }
    }

    assert_eq!(rounds, 3);
    let counts = frontier.store.count_by_resolution().await.unwrap();
    assert_eq!(counts.pending, 0);
    assert_eq!(counts.resolved, 7);

    frontier.store.teardown().await.unwrap();
    assert_eq!(frontier.store.count_by_resolution().await.unwrap().total(), 0);
}

#[derive(Clone)]
struct Offset(usize);

impl PageRequest for Offset {
    type Cursor = usize;

    fn with_cursor(&self, cursor: usize) -> Self {
        Offset(cursor)
    }
}

#[tokio::test]
async fn test_pagination_completeness() {
    let source: Vec<u32> = (0..23).collect();
    let fetch = |Offset(start): Offset| {
        let source = source.clone();
        async move {
            let end = (start + 5).min(source.len());
            let cursor = (end < source.len()).then_some(end);
            Ok::<_, std::convert::Infallible>(Page::new(source[start..end].to_vec(), cursor))
        }
    };

    let all = paginate(fetch, Offset(0), None).await.unwrap();
    assert_eq!(all, source);

    let capped = paginate(fetch, Offset(0), Some(12)).await.unwrap();
    assert_eq!(capped, source[..12].to_vec());
}
