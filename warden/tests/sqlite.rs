#![cfg(feature = "sqlite")]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use warden::{
    InMemoryRepositoryProvider, LockoutConfig, ManualClock, SqliteRepositoryProvider, Warden,
    WardenConfig, connect,
};

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

async fn setup() -> (Arc<ManualClock>, Warden<SqliteRepositoryProvider>) {
    let _ = tracing_subscriber::fmt().try_init();

    let pool = connect("sqlite::memory:").await.unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let warden =
        Warden::new(Arc::new(SqliteRepositoryProvider::new(pool))).with_clock(clock.clone());
    warden.migrate().await.unwrap();
    warden.health_check().await.unwrap();
    (clock, warden)
}

#[tokio::test]
async fn test_sqlite_login_scenario() {
    let (clock, warden) = setup().await;
    let id = "a@b.com";

    for _ in 0..4 {
        warden.record_failure(id).await.unwrap();
    }
    let status = warden.check_status(id).await.unwrap();
    assert!(!status.is_locked);
    assert_eq!(status.remaining_attempts, 1);

    assert!(warden.record_failure(id).await.unwrap().is_locked);
    let status = warden.check_status(id).await.unwrap();
    assert!(status.is_locked);
    assert_eq!(status.remaining_minutes, 15);

    clock.advance(Duration::minutes(16));
    assert!(!warden.check_status(id).await.unwrap().is_locked);
    assert_eq!(warden.record_failure(id).await.unwrap().attempts, 1);
}

#[tokio::test]
async fn test_sqlite_reset_tokens() {
    let (clock, warden) = setup().await;

    let first = warden.issue_reset_token("a@b.com").await.unwrap();
    let second = warden.issue_reset_token("a@b.com").await.unwrap();
    assert!(!warden.validate_reset_token("a@b.com", &first).await.unwrap());
    assert!(warden.validate_reset_token("a@b.com", &second).await.unwrap());

    clock.advance(Duration::minutes(61));
    assert!(!warden.validate_reset_token("a@b.com", &second).await.unwrap());
}

#[tokio::test]
async fn test_sqlite_cleanup() {
    let (clock, warden) = setup().await;
    for _ in 0..5 {
        warden.record_failure("locked@b.com").await.unwrap();
    }
    warden.record_failure("counting@b.com").await.unwrap();
    warden.issue_reset_token("reset@b.com").await.unwrap();

    clock.advance(Duration::hours(2));
    let report = warden.cleanup_expired().await.unwrap();
    assert_eq!(report.attempt_records, 1);
    assert_eq!(report.reset_tokens, 1);

    let status = warden.check_status("counting@b.com").await.unwrap();
    assert_eq!(status.failed_attempts, 1);
}

#[tokio::test]
async fn test_sqlite_custom_lockout() {
    let (clock, warden) = setup().await;
    let config = WardenConfig::default().with_lockout(
        LockoutConfig::default()
            .max_failed_attempts(3)
            .lockout_duration(Duration::minutes(5)),
    );
    let warden = warden.with_config(config).unwrap();

    for _ in 0..3 {
        warden.record_failure("a@b.com").await.unwrap();
    }
    let status = warden.check_status("a@b.com").await.unwrap();
    assert!(status.is_locked);
    assert_eq!(status.remaining_minutes, 5);

    clock.advance(Duration::minutes(5));
    assert!(!warden.is_locked("a@b.com").await.unwrap());
}

#[tokio::test]
async fn test_sqlite_matches_memory_at_sub_millisecond_boundary() {
    let start = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    let (sqlite_clock, sqlite) = setup().await;
    sqlite_clock.set(start);
    let memory_clock = Arc::new(ManualClock::new(start));
    let memory = Warden::new(Arc::new(InMemoryRepositoryProvider::new()))
        .with_clock(memory_clock.clone());

    for _ in 0..5 {
        sqlite.record_failure("a@b.com").await.unwrap();
        memory.record_failure("a@b.com").await.unwrap();
    }

    let until = sqlite.check_status("a@b.com").await.unwrap().locked_until.unwrap();
    assert_eq!(
        memory.check_status("a@b.com").await.unwrap().locked_until,
        Some(until)
    );

    for clock in [&sqlite_clock, &memory_clock] {
        clock.set(until - Duration::microseconds(1));
    }
    assert!(sqlite.is_locked("a@b.com").await.unwrap());
    assert!(memory.is_locked("a@b.com").await.unwrap());

    for clock in [&sqlite_clock, &memory_clock] {
        clock.set(until);
    }
    assert!(!sqlite.is_locked("a@b.com").await.unwrap());
    assert!(!memory.is_locked("a@b.com").await.unwrap());
}
