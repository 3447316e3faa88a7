use myboard_core::db::open_db_in_memory;
use myboard_core::{
    DropOutcome, IgnoredDrop, SqliteKvRepository, Task, TaskPriority, TaskStatus, TaskStore,
    TransitionEngine, ZoneMap,
};

fn seeded_store(conn: &rusqlite::Connection) -> TaskStore<SqliteKvRepository<'_>> {
    let mut store = TaskStore::load(SqliteKvRepository::new(conn));
    let tasks = [5, 7, 9]
        .into_iter()
        .map(|id| Task {
            id,
            title: format!("task {id}"),
            description: None,
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
        })
        .collect();
    store.replace_all(tasks).unwrap();
    store
}

#[test]
fn dropping_task_seven_on_done_moves_only_that_task() {
    let conn = open_db_in_memory().unwrap();
    let mut store = seeded_store(&conn);
    let before = store.tasks().to_vec();
    let mut engine = TransitionEngine::default();

    engine.begin_drag(7);
    engine.hover("column-done");
    let outcome = engine.drop(Some("7"), &mut store).unwrap();

    assert_eq!(
        outcome,
        DropOutcome::Moved {
            id: 7,
            from: TaskStatus::Todo,
            to: TaskStatus::Done
        }
    );
    for (old, new) in before.iter().zip(store.tasks()) {
        if new.id == 7 {
            assert_eq!(new.status, TaskStatus::Done);
        } else {
            assert_eq!(old, new);
        }
    }
    assert_eq!(engine.dragged(), None);
    assert_eq!(engine.hovered(), None);
}

#[test]
fn nested_container_resolves_to_enclosing_status_zone() {
    let conn = open_db_in_memory().unwrap();
    let mut store = seeded_store(&conn);
    let mut zones = ZoneMap::kanban();
    zones.insert_container("card-9", Some("inprogress"));
    zones.insert_container("card-9-meta", Some("card-9"));
    let mut engine = TransitionEngine::new(zones);

    engine.begin_drag(5);
    let outcome = engine.drop_on("card-9-meta", None, &mut store).unwrap();

    assert!(outcome.is_moved());
    assert_eq!(store.get(5).unwrap().status, TaskStatus::InProgress);
}

#[test]
fn missing_transfer_payload_falls_back_to_active_drag() {
    let conn = open_db_in_memory().unwrap();
    let mut store = seeded_store(&conn);
    let mut engine = TransitionEngine::default();

    engine.begin_drag(9);
    engine.hover("done");
    let outcome = engine.drop(Some(""), &mut store).unwrap();

    assert!(outcome.is_moved());
    assert_eq!(store.get(9).unwrap().status, TaskStatus::Done);
}

#[test]
fn transfer_payload_wins_over_active_drag() {
    let conn = open_db_in_memory().unwrap();
    let mut store = seeded_store(&conn);
    let mut engine = TransitionEngine::default();

    engine.begin_drag(9);
    engine.hover("done");
    engine.drop(Some("5"), &mut store).unwrap();

    assert_eq!(store.get(5).unwrap().status, TaskStatus::Done);
    assert_eq!(store.get(9).unwrap().status, TaskStatus::Todo);
}

#[test]
fn unresolvable_drops_are_ignored_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let mut store = seeded_store(&conn);
    let before = store.tasks().to_vec();
    let mut engine = TransitionEngine::default();

    engine.hover("done");
    assert_eq!(
        engine.drop(None, &mut store).unwrap(),
        DropOutcome::Ignored(IgnoredDrop::NoTaskId)
    );

    engine.begin_drag(7);
    engine.hover("sidebar");
    assert_eq!(
        engine.drop(None, &mut store).unwrap(),
        DropOutcome::Ignored(IgnoredDrop::NoTargetZone)
    );

    engine.begin_drag(7);
    engine.hover("done");
    engine.leave("done");
    assert_eq!(
        engine.drop(None, &mut store).unwrap(),
        DropOutcome::Ignored(IgnoredDrop::NoTargetZone)
    );

    engine.hover("done");
    assert_eq!(
        engine.drop(Some("404"), &mut store).unwrap(),
        DropOutcome::Ignored(IgnoredDrop::UnknownTask(404))
    );

    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn end_drag_clears_state() {
    let mut engine = TransitionEngine::default();
    engine.begin_drag(3);
    engine.hover("todo");
    engine.end_drag();
    assert_eq!(engine.dragged(), None);
    assert_eq!(engine.hovered(), None);
}
