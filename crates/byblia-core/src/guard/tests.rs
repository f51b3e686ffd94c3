use super::*;
use axum::http::{HeaderMap, HeaderValue, Method};
use byblia_types::models::config::{OriginConfig, RateLimitConfig};
use std::sync::Arc;
use std::time::Duration;

fn limiter(max_requests: u32) -> Arc<RateLimiter> {
    RateLimiter::new(RateLimitConfig { max_requests, window_secs: 60, sweep_interval_secs: 300 })
}

#[tokio::test(start_paused = true)]
async fn test_sixth_request_in_window_is_rejected() {
    let limiter = limiter(5);

    for i in 0..5 {
        assert!(limiter.allow("203.0.113.7"), "request {} should pass", i + 1);
    }
    assert!(!limiter.allow("203.0.113.7"));
    assert_eq!(limiter.remaining("203.0.113.7"), 0);

    // Other clients are unaffected
    assert!(limiter.allow("198.51.100.1"));
}

#[tokio::test(start_paused = true)]
async fn test_rejections_do_not_extend_the_window() {
    let limiter = limiter(2);

    assert!(limiter.allow("k"));
    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(limiter.allow("k"));

    for _ in 0..10 {
        assert!(!limiter.allow("k"));
    }

    // First timestamp leaves the window at t=60
    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(limiter.allow("k"));
    assert!(!limiter.allow("k"));
}

#[tokio::test(start_paused = true)]
async fn test_accepted_requests_never_exceed_ceiling_in_any_window() {
    let limiter = limiter(5);
    let mut accepted = Vec::new();
    let start = tokio::time::Instant::now();

    for step in 0..400u64 {
        if limiter.allow("busy") {
            accepted.push(start.elapsed());
        }
        // Irregular arrival gaps between 1s and 13s
        tokio::time::advance(Duration::from_secs(1 + (step * 7) % 13)).await;
    }

    assert!(accepted.len() > 5);
    for (i, at) in accepted.iter().enumerate() {
        let in_window = accepted[..=i]
            .iter()
            .filter(|earlier| *at - **earlier < Duration::from_secs(60))
            .count();
        assert!(in_window <= 5, "{} accepted inside the window ending at {:?}", in_window, at);
    }
}

#[tokio::test(start_paused = true)]
async fn test_sweep_evicts_idle_keys() {
    let limiter = limiter(5);

    assert!(limiter.allow("idle"));
    tokio::time::advance(Duration::from_secs(45)).await;
    assert!(limiter.allow("active"));
    assert_eq!(limiter.tracked_keys(), 2);

    tokio::time::advance(Duration::from_secs(20)).await;
    assert_eq!(limiter.sweep(), 1);
    assert_eq!(limiter.tracked_keys(), 1);
    assert_eq!(limiter.remaining("active"), 4);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_bounds_memory() {
    let limiter = limiter(5);
    assert!(limiter.start_sweeper());
    assert!(!limiter.start_sweeper(), "a second sweeper must not be spawned");

    for i in 0..100 {
        assert!(limiter.allow(&format!("10.0.0.{}", i)));
    }
    assert_eq!(limiter.tracked_keys(), 100);

    tokio::time::sleep(Duration::from_secs(301)).await;
    assert_eq!(limiter.tracked_keys(), 0);

    assert!(limiter.stop());
    tokio::task::yield_now().await;
    assert!(!limiter.is_sweeper_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_budget() {
    let limiter = limiter(5);

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.allow("same-client") })
        })
        .collect();

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 5);
}

fn production_guard() -> OriginGuard {
    OriginGuard::new(&OriginConfig::default())
}

#[test]
fn test_allowed_origin_by_substring() {
    let guard = production_guard();
    assert!(guard.check(Some("https://byblia.vercel.app"), &Method::POST).is_allowed());
    assert!(guard.check(Some("https://byblia.vercel.app/chat?x=1"), &Method::POST).is_allowed());
}

#[test]
fn test_foreign_origin_is_rejected() {
    let guard = production_guard();
    assert_eq!(
        guard.check(Some("https://evil.example"), &Method::POST),
        OriginDecision::Reject(OriginRejection::NotAllowed {
            origin: "https://evil.example".to_string()
        })
    );
}

#[test]
fn test_missing_origin_only_allowed_for_preflight() {
    let guard = production_guard();
    assert_eq!(
        guard.check(None, &Method::POST),
        OriginDecision::Reject(OriginRejection::MissingOrigin)
    );
    assert!(guard.check(None, &Method::OPTIONS).is_allowed());
    assert!(!guard.check(Some("   "), &Method::POST).is_allowed());
}

#[test]
fn test_development_mode_accepts_absent_origin_and_loopback() {
    let guard = OriginGuard::new(&OriginConfig { development: true, ..OriginConfig::default() });
    assert!(guard.check(None, &Method::POST).is_allowed());
    assert!(guard.check(Some("http://localhost:5173"), &Method::POST).is_allowed());
    assert!(!guard.check(Some("http://localhost:9999"), &Method::POST).is_allowed());
}

#[test]
fn test_disabled_guard_allows_everything() {
    let guard = OriginGuard::new(&OriginConfig { disabled: true, ..OriginConfig::default() });
    assert!(guard.check(None, &Method::POST).is_allowed());
    assert!(guard.check(Some("https://evil.example"), &Method::GET).is_allowed());
}

#[test]
fn test_declared_origin_prefers_origin_header() {
    let mut headers = HeaderMap::new();
    headers.insert("referer", HeaderValue::from_static("https://byblia.vercel.app/page"));
    assert_eq!(OriginGuard::declared_origin(&headers), Some("https://byblia.vercel.app/page"));

    headers.insert("origin", HeaderValue::from_static("https://other.example"));
    assert_eq!(OriginGuard::declared_origin(&headers), Some("https://other.example"));

    assert_eq!(OriginGuard::declared_origin(&HeaderMap::new()), None);
}
