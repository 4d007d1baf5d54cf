//! Storage-level tests: migrations, the owner_id reconciliation, and the
//! task lifecycle rules, run against scratch SQLite databases.

use tempfile::TempDir;
use todod::identity::VisitorId;
use todod::storage::Storage;
use todod::tasks::{TaskError, TaskStore};

async fn scratch_store(dir: &TempDir) -> TaskStore {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("todos.db").display());
    let storage = Storage::new(&url).await.unwrap();
    TaskStore::new(storage.pool())
}

#[tokio::test]
async fn migration_and_reconciliation_are_rerunnable() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("todos.db").display());

    // Opening the same database twice must not fail: the versioned
    // migration is already applied and the ALTER hits a duplicate column.
    let first = Storage::new(&url).await.unwrap();
    drop(first);
    Storage::new(&url).await.unwrap();
}

#[tokio::test]
async fn created_tasks_start_incomplete_and_owned() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let visitor = VisitorId::generate();

    let task = store.create("buy milk", &visitor).await.unwrap();
    assert!(!task.is_complete);
    assert_eq!(task.title, "buy milk");
    assert_eq!(task.owner_id.as_deref(), Some(visitor.as_str()));
}

#[tokio::test]
async fn empty_titles_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let visitor = VisitorId::generate();

    let task = store.create("", &visitor).await.unwrap();
    assert_eq!(task.title, "");
}

#[tokio::test]
async fn toggle_parity() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let visitor = VisitorId::generate();
    let task = store.create("laundry", &visitor).await.unwrap();

    let once = store.toggle(task.id, &visitor).await.unwrap();
    assert!(once.is_complete);
    let twice = store.toggle(task.id, &visitor).await.unwrap();
    assert!(!twice.is_complete);
    let thrice = store.toggle(task.id, &visitor).await.unwrap();
    assert!(thrice.is_complete);
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let visitor = VisitorId::generate();

    for title in ["a", "b", "c"] {
        store.create(title, &visitor).await.unwrap();
    }
    let tasks = store.list_visible(&visitor).await.unwrap();
    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(tasks.len(), 3);
}

#[tokio::test]
async fn foreign_tasks_are_invisible_and_immutable() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let alice = VisitorId::generate();
    let bob = VisitorId::generate();

    let task = store.create("alice's task", &alice).await.unwrap();

    assert!(store.list_visible(&bob).await.unwrap().is_empty());

    let err = store.toggle(task.id, &bob).await.unwrap_err();
    assert!(matches!(err, TaskError::Unauthorized));
    let err = store.delete(task.id, &bob).await.unwrap_err();
    assert!(matches!(err, TaskError::Unauthorized));

    // No state change happened.
    let row = store.get(task.id).await.unwrap().unwrap();
    assert!(!row.is_complete);
    assert_eq!(row.owner_id.as_deref(), Some(alice.as_str()));
}

#[tokio::test]
async fn deleted_tasks_are_gone_for_good() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let visitor = VisitorId::generate();
    let task = store.create("ephemeral", &visitor).await.unwrap();

    store.delete(task.id, &visitor).await.unwrap();

    assert!(store.list_visible(&visitor).await.unwrap().is_empty());
    assert!(matches!(
        store.toggle(task.id, &visitor).await.unwrap_err(),
        TaskError::NotFound
    ));
    assert!(matches!(
        store.delete(task.id, &visitor).await.unwrap_err(),
        TaskError::NotFound
    ));
}

#[tokio::test]
async fn legacy_task_is_adopted_on_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("todos.db").display());
    let storage = Storage::new(&url).await.unwrap();
    let store = TaskStore::new(storage.pool());

    // A row predating ownership tracking has no owner.
    sqlx::query("INSERT INTO tasks (title, is_complete) VALUES ('legacy', 0)")
        .execute(&storage.pool())
        .await
        .unwrap();

    let alice = VisitorId::generate();
    let bob = VisitorId::generate();

    // Unowned: visible to everyone.
    assert_eq!(store.list_visible(&alice).await.unwrap().len(), 1);
    assert_eq!(store.list_visible(&bob).await.unwrap().len(), 1);

    let id = store.list_visible(&alice).await.unwrap()[0].id;
    let adopted = store.toggle(id, &alice).await.unwrap();
    assert!(adopted.is_complete);
    assert_eq!(adopted.owner_id.as_deref(), Some(alice.as_str()));

    // Adoption is one-way: now only alice sees it.
    assert_eq!(store.list_visible(&alice).await.unwrap().len(), 1);
    assert!(store.list_visible(&bob).await.unwrap().is_empty());

    // A later toggle by the owner does not rewrite owner_id.
    let again = store.toggle(id, &alice).await.unwrap();
    assert_eq!(again.owner_id.as_deref(), Some(alice.as_str()));
}

#[tokio::test]
async fn delete_of_legacy_task_does_not_adopt() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("todos.db").display());
    let storage = Storage::new(&url).await.unwrap();
    let store = TaskStore::new(storage.pool());

    sqlx::query("INSERT INTO tasks (title, is_complete) VALUES ('legacy', 0)")
        .execute(&storage.pool())
        .await
        .unwrap();

    let visitor = VisitorId::generate();
    let id = store.list_visible(&visitor).await.unwrap()[0].id;
    store.delete(id, &visitor).await.unwrap();
    assert!(store.get(id).await.unwrap().is_none());
}
