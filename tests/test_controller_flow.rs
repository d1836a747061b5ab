//! Scenario tests for the task list controller against an in-memory store.

mod common;

use common::{MemoryTaskStore, ScriptedDialogs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use task_link::dialogs::DialogOutcome;
use task_link::models::{TaskId, UserId};
use task_link::{ControllerEvents, TaskListController};

fn uid() -> UserId {
    UserId::new("u1")
}

async fn active_controller(
    store: &MemoryTaskStore,
    dialogs: &ScriptedDialogs,
) -> TaskListController<MemoryTaskStore, ScriptedDialogs> {
    let mut controller = TaskListController::new(uid(), store.clone(), dialogs.clone());
    controller.activate().await.unwrap();
    // Drain the initial snapshot delivered on registration.
    controller.next_change().await.unwrap().unwrap();
    controller
}

#[tokio::test]
async fn rendered_list_equals_latest_snapshot() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    store.seed("first", false).await;
    controller.next_change().await.unwrap().unwrap();
    assert_eq!(controller.tasks().len(), 1);

    store.seed("second", false).await;
    controller.next_change().await.unwrap().unwrap();

    // Newest first, and nothing left over from the earlier snapshot.
    let texts: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);
}

#[tokio::test]
async fn add_trimmed_empty_is_a_silent_noop() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let controller = active_controller(&store, &dialogs).await;

    controller.add("").await.unwrap();
    controller.add("   ").await.unwrap();
    assert!(store.inserts().is_empty());
}

#[tokio::test]
async fn add_issues_exactly_one_insert_with_done_false() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let controller = active_controller(&store, &dialogs).await;

    controller.add("  buy milk  ").await.unwrap();

    let inserts = store.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].text, "buy milk");
    assert!(!inserts[0].done);
}

#[tokio::test]
async fn toggle_flips_the_rendered_flag() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    let id = store.seed("water plants", false).await;
    controller.next_change().await.unwrap().unwrap();

    controller.toggle(&id).await.unwrap();
    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, id);
    assert_eq!(updates[0].1.done, Some(true));
    assert_eq!(updates[0].1.text, None);

    // The rendered flag changes only through the snapshot round-trip.
    controller.next_change().await.unwrap().unwrap();
    assert!(controller.tasks()[0].done);

    controller.toggle(&id).await.unwrap();
    assert_eq!(store.updates()[1].1.done, Some(false));
}

#[tokio::test]
async fn toggle_unknown_id_writes_nothing() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let controller = active_controller(&store, &dialogs).await;

    controller.toggle(&TaskId::new("missing")).await.unwrap();
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn edit_cancel_and_empty_leave_text_unchanged() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    let id = store.seed("original", false).await;
    controller.next_change().await.unwrap().unwrap();

    dialogs.push_prompt(None);
    controller.edit(&id).await.unwrap();

    dialogs.push_prompt(Some("   "));
    controller.edit(&id).await.unwrap();

    assert!(store.updates().is_empty());
    assert_eq!(dialogs.prompt_calls(), 2);
    // The prompt is seeded with the current text both times.
    assert_eq!(dialogs.prompt_initials(), ["original", "original"]);
}

#[tokio::test]
async fn edit_confirmed_issues_one_trimmed_update() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    let id = store.seed("original", false).await;
    controller.next_change().await.unwrap().unwrap();

    dialogs.push_prompt(Some("  new text  "));
    controller.edit(&id).await.unwrap();

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.text.as_deref(), Some("new text"));
    assert_eq!(updates[0].1.done, None);
}

#[tokio::test]
async fn delete_issues_a_single_document_delete() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    let id = store.seed("to remove", false).await;
    controller.next_change().await.unwrap().unwrap();

    controller.delete(&id).await.unwrap();
    assert_eq!(store.deletes(), vec![id]);

    controller.next_change().await.unwrap().unwrap();
    assert!(controller.tasks().is_empty());
}

#[tokio::test]
async fn clear_completed_with_none_skips_dialog_and_delete() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    store.seed("still open", false).await;
    controller.next_change().await.unwrap().unwrap();

    controller.clear_completed().await.unwrap();

    assert_eq!(store.completed_queries(), 1);
    assert_eq!(dialogs.confirm_calls(), 0, "no confirmation for an empty result");
    assert!(store.batch_deletes().is_empty());
}

#[tokio::test]
async fn clear_completed_confirmed_issues_one_exact_batch() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    let done_a = store.seed("done a", true).await;
    store.seed("open", false).await;
    let done_b = store.seed("done b", true).await;
    controller.next_change().await.unwrap().unwrap();
    controller.next_change().await.unwrap().unwrap();
    controller.next_change().await.unwrap().unwrap();
    assert!(controller.has_completed());

    dialogs.push_confirm(DialogOutcome::Accepted);
    controller.clear_completed().await.unwrap();

    let batches = store.batch_deletes();
    assert_eq!(batches.len(), 1, "exactly one atomic batch");
    let mut batch = batches[0].clone();
    batch.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    let mut expected = vec![done_a, done_b];
    expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    assert_eq!(batch, expected);
    assert!(store.deletes().is_empty(), "no single deletes were issued");

    controller.next_change().await.unwrap().unwrap();
    assert_eq!(controller.remaining_count(), 1);
    assert!(!controller.has_completed());
}

#[tokio::test]
async fn clear_completed_cancelled_deletes_nothing() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    store.seed("done", true).await;
    controller.next_change().await.unwrap().unwrap();

    dialogs.push_confirm(DialogOutcome::Cancelled);
    controller.clear_completed().await.unwrap();

    assert_eq!(dialogs.confirm_calls(), 1);
    assert!(store.batch_deletes().is_empty());
    assert_eq!(controller.tasks().len(), 1);
}

#[tokio::test]
async fn remaining_count_recomputes_on_every_snapshot() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    store.seed("a", false).await;
    controller.next_change().await.unwrap().unwrap();
    store.seed("b", true).await;
    controller.next_change().await.unwrap().unwrap();
    assert_eq!(controller.remaining_count(), 1);

    store.seed("c", false).await;
    controller.next_change().await.unwrap().unwrap();
    assert_eq!(controller.remaining_count(), 2);
}

#[tokio::test]
async fn mutation_failure_returns_err_and_fires_the_hook() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let noticed = Arc::new(AtomicUsize::new(0));
    let sink = noticed.clone();
    let events = ControllerEvents::new().on_mutation_error(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    let mut controller =
        TaskListController::with_events(uid(), store.clone(), dialogs.clone(), events);
    controller.activate().await.unwrap();
    controller.next_change().await.unwrap().unwrap();

    store.fail_next();
    let result = controller.add("doomed").await;

    assert!(result.is_err());
    assert_eq!(noticed.load(Ordering::SeqCst), 1);
    // The failure is non-fatal: the next write goes through.
    controller.add("fine").await.unwrap();
    assert_eq!(store.inserts().len(), 1);
}

#[tokio::test]
async fn double_activation_is_rejected() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;

    assert!(controller.activate().await.is_err());
    assert_eq!(store.active_subscriptions(), 1, "still exactly one subscription");
}

#[tokio::test]
async fn close_releases_the_subscription_exactly_once() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let mut controller = active_controller(&store, &dialogs).await;
    assert_eq!(store.active_subscriptions(), 1);

    controller.close();
    assert_eq!(store.active_subscriptions(), 0);
    assert!(!controller.is_active());
    assert!(controller.next_change().await.is_none());

    // Idempotent.
    controller.close();
    assert_eq!(store.active_subscriptions(), 0);
}

#[tokio::test]
async fn dropping_the_controller_releases_the_subscription() {
    let store = MemoryTaskStore::new();
    let dialogs = ScriptedDialogs::new();
    let controller = active_controller(&store, &dialogs).await;
    assert_eq!(store.active_subscriptions(), 1);

    drop(controller);
    assert_eq!(store.active_subscriptions(), 0);
}
