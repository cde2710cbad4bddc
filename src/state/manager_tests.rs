//! Tests for the state manager

use super::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn day(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

#[tokio::test]
async fn test_bookmarks_only_move_forward() {
    let manager = StateManager::in_memory();
    assert!(manager.bookmark("Account").await.is_none());

    assert!(manager.advance("Account", day(10)).await);
    assert!(!manager.advance("Account", day(5)).await);
    assert!(!manager.advance("Account", day(10)).await);
    assert!(manager.advance("Account", day(20)).await);

    assert_eq!(manager.bookmark("Account").await, Some(day(20)));
}

#[tokio::test]
async fn test_streams_have_independent_bookmarks() {
    let manager = StateManager::in_memory();
    manager.advance("Account", day(10)).await;
    manager.advance("Invoice", day(3)).await;

    assert_eq!(manager.bookmark("Account").await, Some(day(10)));
    assert_eq!(manager.bookmark("Invoice").await, Some(day(3)));
    assert!(manager.bookmark("Currency").await.is_none());
}

#[tokio::test]
async fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::load(&path).await.unwrap();
    manager.advance("Account", day(10)).await;
    manager.save().await.unwrap();

    let reloaded = StateManager::load(&path).await.unwrap();
    assert_eq!(reloaded.bookmark("Account").await, Some(day(10)));
}

#[tokio::test]
async fn test_missing_state_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let manager = StateManager::load(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(manager.snapshot().await, ReplicationState::default());
}

#[tokio::test]
async fn test_corrupt_state_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    tokio::fs::write(&path, "not json").await.unwrap();
    assert!(StateManager::load(&path).await.is_err());
}

#[tokio::test]
async fn test_in_memory_save_is_a_no_op() {
    let manager = StateManager::in_memory();
    manager.advance("Account", day(1)).await;
    manager.save().await.unwrap();
}
