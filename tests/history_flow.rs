//! End-to-end history flows through the edit dispatcher, backed by the
//! in-memory stores and the mock rasterizer.

use std::sync::Arc;

use plugin_rasterizer::mock::MockRasterizer;
use rasterhub_core::config::canvas::CanvasConfig;
use rasterhub_database::memory::{MemorySessionStore, MemorySnapshotStore};
use rasterhub_database::store::{SessionStore, SnapshotStore};
use rasterhub_entity::color::Color;
use rasterhub_entity::op::{OperationDescriptor, PathPoint};
use rasterhub_service::dispatch::command::EditCommand;
use rasterhub_service::dispatch::service::EditDispatcher;
use rasterhub_service::history::manager::HistoryManager;
use rasterhub_service::session::resolver::SessionResolver;

struct World {
    dispatcher: EditDispatcher,
    snapshots: Arc<MemorySnapshotStore>,
    sessions: Arc<MemorySessionStore>,
}

fn world(retention_cap: i64) -> World {
    let sessions = Arc::new(MemorySessionStore::new());
    let snapshots = Arc::new(MemorySnapshotStore::new(&sessions));
    let resolver = SessionResolver::new(
        snapshots.clone(),
        sessions.clone(),
        CanvasConfig::default(),
    );
    let history = HistoryManager::new(snapshots.clone(), retention_cap);
    let dispatcher = EditDispatcher::new(
        resolver,
        history,
        sessions.clone(),
        Arc::new(MockRasterizer::new()),
    );
    World {
        dispatcher,
        snapshots,
        sessions,
    }
}

fn line(offset: i32) -> EditCommand {
    EditCommand::Draw(OperationDescriptor::Line {
        x1: offset,
        y1: offset,
        x2: offset + 10,
        y2: offset + 10,
        color: Color::new(0x12, 0x34, 0x56),
        size: 1,
    })
}

fn brush() -> EditCommand {
    EditCommand::Draw(OperationDescriptor::BrushStroke {
        path: vec![PathPoint::new(2, 2), PathPoint::new(8, 8)],
        color: Color::new(0, 0, 0),
        size: 5,
    })
}

#[tokio::test]
async fn full_undo_redo_lifecycle() {
    let w = world(20);

    let initial = w
        .dispatcher
        .dispatch(
            "tok",
            EditCommand::InitialCanvas {
                width: None,
                height: None,
                fill_color: None,
            },
        )
        .await
        .unwrap();
    assert!(!initial.can_undo);
    assert!(!initial.can_redo);

    for i in 0..3 {
        let outcome = w.dispatcher.dispatch("tok", line(i * 10)).await.unwrap();
        assert!(outcome.can_undo);
    }
    let session = w.sessions.find("tok").await.unwrap().unwrap();
    assert_eq!(session.version_pointer, 3);

    // Two undos land on version 1.
    w.dispatcher
        .dispatch("tok", EditCommand::Undo)
        .await
        .unwrap();
    let undone = w
        .dispatcher
        .dispatch("tok", EditCommand::Undo)
        .await
        .unwrap();
    assert_eq!(undone.message, "Undo applied.");
    assert!(undone.can_undo);
    assert!(undone.can_redo);

    let redone = w
        .dispatcher
        .dispatch("tok", EditCommand::Redo)
        .await
        .unwrap();
    assert_eq!(redone.message, "Redo applied.");

    // Editing at version 2 discards version 3 and becomes version 3.
    let branched = w.dispatcher.dispatch("tok", brush()).await.unwrap();
    assert!(!branched.can_redo);

    let session = w.sessions.find("tok").await.unwrap().unwrap();
    assert_eq!(session.version_pointer, 3);
    assert_eq!(w.snapshots.max_version(session.drawing_id).await.unwrap(), Some(3));
    assert_eq!(w.snapshots.count(session.drawing_id).await.unwrap(), 4);
}

#[tokio::test]
async fn retention_cap_evicts_oldest_without_renumbering() {
    let w = world(20);

    for i in 0..25 {
        w.dispatcher.dispatch("tok", line(i)).await.unwrap();
    }

    let session = w.sessions.find("tok").await.unwrap().unwrap();
    assert_eq!(session.version_pointer, 25);
    assert_eq!(w.snapshots.count(session.drawing_id).await.unwrap(), 20);
    assert_eq!(w.snapshots.min_version(session.drawing_id).await.unwrap(), Some(6));
    assert_eq!(w.snapshots.max_version(session.drawing_id).await.unwrap(), Some(25));

    // Undo all the way down stops at the surviving minimum, version 6.
    let mut last = None;
    for _ in 0..25 {
        last = Some(
            w.dispatcher
                .dispatch("tok", EditCommand::Undo)
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    assert_eq!(last.message, "No further actions to undo.");
    assert!(!last.can_undo);
    assert!(last.can_redo);

    let session = w.sessions.find("tok").await.unwrap().unwrap();
    assert_eq!(session.version_pointer, 6);
}

#[tokio::test]
async fn lost_history_resets_session() {
    let w = world(20);

    w.dispatcher.dispatch("tok", brush()).await.unwrap();
    let old = w.sessions.find("tok").await.unwrap().unwrap();

    // Simulate external retention wiping the drawing from under the
    // session.
    w.snapshots.delete_drawing(old.drawing_id).await.unwrap();

    let outcome = w
        .dispatcher
        .dispatch(
            "tok",
            EditCommand::InitialCanvas {
                width: None,
                height: None,
                fill_color: None,
            },
        )
        .await
        .unwrap();
    assert!(!outcome.can_undo);

    let fresh = w.sessions.find("tok").await.unwrap().unwrap();
    assert_ne!(fresh.drawing_id, old.drawing_id);
    assert_eq!(fresh.version_pointer, 0);
    assert_eq!(w.snapshots.count(fresh.drawing_id).await.unwrap(), 1);
}

#[tokio::test]
async fn version_range_stays_contiguous() {
    let w = world(5);

    for i in 0..9 {
        w.dispatcher.dispatch("tok", line(i)).await.unwrap();
        if i % 3 == 2 {
            w.dispatcher
                .dispatch("tok", EditCommand::Undo)
                .await
                .unwrap();
        }
    }

    let session = w.sessions.find("tok").await.unwrap().unwrap();
    let min = w
        .snapshots
        .min_version(session.drawing_id)
        .await
        .unwrap()
        .unwrap();
    let max = w
        .snapshots
        .max_version(session.drawing_id)
        .await
        .unwrap()
        .unwrap();
    let count = w.snapshots.count(session.drawing_id).await.unwrap();
    assert_eq!(max - min + 1, count, "versions must have no gaps");
    for version in min..=max {
        assert!(
            w.snapshots
                .exists(session.drawing_id, version)
                .await
                .unwrap()
        );
    }
    assert!(min <= session.version_pointer && session.version_pointer <= max);
}
