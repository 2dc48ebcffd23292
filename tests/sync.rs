mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{service, task, FakeBackend};
use zest::constants::{ERROR_NO_CREDENTIAL, KEY_REMOTE_COMPLETED_TASKS, KEY_REMOTE_TASKS};
use zest::state::{Operation, Outcome};
use zest::storage::LocalStorage;
use zest::sync::{Intent, SyncService};
use zest::todoist::{AccessToken, ActivityQuery, ApiError, SyncCursor};
use zest::{Priority, TaskChanges, TaskDraft};

#[tokio::test]
async fn test_full_sync_replaces_tasks_and_stores_cursor() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a"), task("2", "b")], "cursor-1"));
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();
    storage.save_tasks(KEY_REMOTE_TASKS, &[task("old", "stale")]).await.unwrap();

    let sync = SyncService::new(backend.clone(), storage.clone(), None).await.unwrap();
    assert_eq!(sync.state().tasks, vec![task("old", "stale")]);

    let outcome = sync.full_sync().await.unwrap();
    assert_eq!(outcome.operation(), Operation::FullSync);

    let state = sync.state();
    assert_eq!(state.tasks, vec![task("1", "a"), task("2", "b")]);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(storage.sync_cursor().await.unwrap(), Some(SyncCursor::new("cursor-1")));
    assert_eq!(storage.load_tasks(KEY_REMOTE_TASKS).await.unwrap(), state.tasks);
    assert_eq!(*backend.tokens.lock().unwrap(), vec!["secret".to_string()]);
}

#[tokio::test]
async fn test_update_replaces_only_the_matching_task() {
    let backend = Arc::new(FakeBackend::with_sync(
        vec![task("41", "a"), task("42", "b"), task("43", "c")],
        "c1",
    ));
    let sync = service(backend, Some("secret")).await;
    sync.full_sync().await.unwrap();

    let changes = TaskChanges {
        name: Some("renamed".to_string()),
        priority: Some(Priority::Urgent),
        ..Default::default()
    };
    sync.update_task("42", changes).await.unwrap();

    let tasks = sync.state().tasks;
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0], task("41", "a"));
    assert_eq!(tasks[1].name, "renamed");
    assert_eq!(tasks[1].priority, Priority::Urgent);
    assert_eq!(tasks[2], task("43", "c"));
}

#[tokio::test]
async fn test_update_of_unknown_id_leaves_tasks_alone() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    let sync = service(backend, Some("secret")).await;
    sync.full_sync().await.unwrap();

    let changes = TaskChanges {
        name: Some("ghost".to_string()),
        ..Default::default()
    };
    sync.update_task("999", changes).await.unwrap();
    assert_eq!(sync.state().tasks, vec![task("1", "a")]);
}

#[tokio::test]
async fn test_create_appends_service_copy() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();
    let sync = SyncService::new(backend, storage.clone(), None).await.unwrap();
    sync.full_sync().await.unwrap();

    let outcome = sync.create_task(TaskDraft::new("  Buy milk  ")).await.unwrap();
    let Outcome::Created(created) = outcome else {
        panic!("expected a created task");
    };
    assert_eq!(created.name, "Buy milk");

    let tasks = sync.state().tasks;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks.last(), Some(&created));
    assert_eq!(storage.load_tasks(KEY_REMOTE_TASKS).await.unwrap(), tasks);
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_before_the_backend() {
    let backend = Arc::new(FakeBackend::default());
    let sync = service(backend.clone(), Some("secret")).await;

    assert!(sync.create_task(TaskDraft::new("   ")).await.is_err());
    assert!(backend.calls().is_empty());
    assert!(sync.state().error.is_some());
}

#[tokio::test]
async fn test_missing_credential_rejects_without_calling_backend() {
    let backend = Arc::new(FakeBackend::default());
    let sync = service(backend.clone(), None).await;

    let err = sync.full_sync().await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::MissingCredential)));

    let state = sync.state();
    assert_eq!(state.error.as_deref(), Some(ERROR_NO_CREDENTIAL));
    assert!(!state.loading);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_reopen_without_cursor_fails() {
    let backend = Arc::new(FakeBackend::default());
    let sync = service(backend.clone(), Some("secret")).await;

    let err = sync.reopen_task("7").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::MissingCursor)));
    assert!(backend.calls().is_empty());
    assert!(sync.state().error.is_some());
}

#[tokio::test]
async fn test_commands_use_cursor_from_last_full_sync() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("7", "a")], "cursor-42"));
    let sync = service(backend.clone(), Some("secret")).await;
    sync.full_sync().await.unwrap();

    sync.reopen_task("7").await.unwrap();
    sync.delete_task("7").await.unwrap();

    assert_eq!(backend.cursors(), vec!["cursor-42", "cursor-42"]);
}

#[tokio::test]
async fn test_close_reopen_delete_leave_slices_untouched() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("7", "a")], "c1"));
    let sync = service(backend, Some("secret")).await;
    sync.full_sync().await.unwrap();
    let before = sync.state();

    sync.close_task("7").await.unwrap();
    sync.reopen_task("7").await.unwrap();
    sync.delete_task("7").await.unwrap();

    let after = sync.state();
    assert_eq!(after.tasks, before.tasks);
    assert_eq!(after.completed_tasks, before.completed_tasks);
    assert_eq!(after.productivity_tasks, before.productivity_tasks);
}

#[tokio::test]
async fn test_rejection_records_status_message() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail_with(403, r#"{"error": "Forbidden"}"#);
    let sync = service(backend, Some("secret")).await;

    let err = sync.fetch_completed_tasks().await.unwrap_err();
    let api = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api.status().map(|s| s.as_u16()), Some(403));
    assert_eq!(sync.state().error.as_deref(), Some("HTTP 403: Forbidden"));
    assert!(!sync.is_loading());
}

#[tokio::test]
async fn test_error_cleared_by_next_request() {
    let backend = Arc::new(FakeBackend::with_sync(vec![], "c1"));
    backend.fail_with(500, "boom");
    let sync = service(backend.clone(), Some("secret")).await;
    assert!(sync.full_sync().await.is_err());
    assert!(sync.state().error.is_some());

    *backend.fail_status.lock().unwrap() = None;
    sync.full_sync().await.unwrap();
    assert!(sync.state().error.is_none());
}

#[tokio::test]
async fn test_activity_and_completed_slices_are_independent() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("5", "live")], "c1"));
    *backend.completed.lock().unwrap() = vec![task("5", "done")];
    *backend.activity.lock().unwrap() = vec![task("5", "event")];
    let sync = service(backend, Some("secret")).await;

    sync.full_sync().await.unwrap();
    sync.fetch_completed_tasks().await.unwrap();
    sync.fetch_activity(ActivityQuery::default()).await.unwrap();
    sync.fetch_task("5").await.unwrap();

    let changes = TaskChanges {
        name: Some("edited".to_string()),
        ..Default::default()
    };
    sync.update_task("5", changes).await.unwrap();

    let state = sync.state();
    assert_eq!(state.tasks[0].name, "edited");
    assert_eq!(state.completed_tasks, vec![task("5", "done")]);
    assert_eq!(state.productivity_tasks, vec![task("5", "event")]);
    assert_eq!(state.selected_activity_task, Some(task("5", "fetched")));
}

#[tokio::test]
async fn test_completed_snapshot_survives_restart() {
    let backend = Arc::new(FakeBackend::default());
    *backend.completed.lock().unwrap() = vec![task("9", "done")];
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();

    let sync = SyncService::new(backend.clone(), storage.clone(), None).await.unwrap();
    sync.fetch_completed_tasks().await.unwrap();
    assert_eq!(
        storage.load_tasks(KEY_REMOTE_COMPLETED_TASKS).await.unwrap(),
        vec![task("9", "done")]
    );

    let restarted = SyncService::new(backend, storage, None).await.unwrap();
    assert_eq!(restarted.state().completed_tasks, vec![task("9", "done")]);
}

#[tokio::test]
async fn test_request_timeout() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    backend.delay_by(Duration::from_secs(5));
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();
    let sync = SyncService::new(backend, storage.clone(), Some(Duration::from_millis(20)))
        .await
        .unwrap();

    let err = sync.full_sync().await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Timeout)));

    let state = sync.state();
    assert!(!state.loading);
    assert!(state.tasks.is_empty());
    assert!(state.error.is_some());
    assert_eq!(storage.sync_cursor().await.unwrap(), None);
}

#[tokio::test]
async fn test_cancelled_request_releases_loading() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    backend.delay_by(Duration::from_secs(5));
    let sync = service(backend.clone(), Some("secret")).await;

    let handle = sync.spawn(Intent::FullSync);
    assert_eq!(handle.operation(), Operation::FullSync);

    // Wait until the backend call is underway
    for _ in 0..100 {
        if !backend.calls().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(sync.is_loading());

    handle.cancel();
    let err = handle.join().await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Cancelled)));

    let state = sync.state();
    assert!(!state.loading);
    assert!(state.tasks.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_spawned_request_completes() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    let sync = service(backend, Some("secret")).await;

    let outcome = sync.spawn(Intent::FullSync).join().await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Synced {
            tasks: vec![task("1", "a")],
            cursor: SyncCursor::new("c1"),
        }
    );
    assert_eq!(sync.state().tasks, vec![task("1", "a")]);
}

#[tokio::test]
async fn test_execute_routes_each_intent() {
    let backend = Arc::new(FakeBackend::with_sync(vec![task("1", "a")], "c1"));
    let sync = service(backend.clone(), Some("secret")).await;

    let intents = vec![
        Intent::FullSync,
        Intent::Create(TaskDraft::new("new")),
        Intent::Update {
            task_id: "1".to_string(),
            changes: TaskChanges {
                description: Some("notes".to_string()),
                ..Default::default()
            },
        },
        Intent::Close("1".to_string()),
        Intent::Reopen("1".to_string()),
        Intent::Delete("1".to_string()),
        Intent::FetchCompleted,
        Intent::FetchTask("1".to_string()),
        Intent::FetchActivity(ActivityQuery::default()),
    ];
    for intent in intents {
        let op = intent.operation();
        let outcome = sync.execute(intent).await.unwrap();
        assert_eq!(outcome.operation(), op);
    }

    assert_eq!(
        backend.calls(),
        vec![
            "full_sync",
            "create_task",
            "update_task",
            "close_task",
            "reopen_task",
            "delete_task",
            "fetch_completed_tasks",
            "fetch_task",
            "fetch_activity",
        ]
    );
}

#[tokio::test]
async fn test_superseded_sync_keeps_newer_cursor() {
    let backend = Arc::new(FakeBackend::default());
    backend.script_sync(Duration::from_millis(300), vec![task("old", "slow")], "cursor-old");
    backend.script_sync(Duration::ZERO, vec![task("new", "fast")], "cursor-new");
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();
    let sync = SyncService::new(backend.clone(), storage.clone(), None).await.unwrap();

    let slow = sync.spawn(Intent::FullSync);
    backend.wait_for_calls(1).await;
    sync.full_sync().await.unwrap();

    let err = slow.join().await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Superseded)));

    assert_eq!(sync.state().tasks, vec![task("new", "fast")]);
    assert!(!sync.is_loading());
    assert_eq!(storage.sync_cursor().await.unwrap(), Some(SyncCursor::new("cursor-new")));
    assert_eq!(
        storage.load_tasks(KEY_REMOTE_TASKS).await.unwrap(),
        vec![task("new", "fast")]
    );
}

#[tokio::test]
async fn test_cancelling_newest_sync_lets_older_one_land() {
    let backend = Arc::new(FakeBackend::default());
    backend.script_sync(Duration::from_millis(300), vec![task("1", "kept")], "cursor-kept");
    backend.script_sync(Duration::from_secs(5), vec![task("2", "abandoned")], "cursor-abandoned");
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set_access_token(&AccessToken::new("secret")).await.unwrap();
    let sync = SyncService::new(backend.clone(), storage.clone(), None).await.unwrap();

    let older = sync.spawn(Intent::FullSync);
    backend.wait_for_calls(1).await;
    let newer = sync.spawn(Intent::FullSync);
    backend.wait_for_calls(2).await;

    newer.cancel();
    let err = newer.join().await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Cancelled)));

    let outcome = older.join().await.unwrap();
    assert_eq!(outcome.operation(), Operation::FullSync);
    assert_eq!(sync.state().tasks, vec![task("1", "kept")]);
    assert!(!sync.is_loading());
    assert_eq!(storage.sync_cursor().await.unwrap(), Some(SyncCursor::new("cursor-kept")));
}
