use chrono::NaiveDate;
use taskfocus::config::{CompletionPolicy, Config};
use taskfocus::db::{SqliteStore, TaskStore};
use taskfocus::error::{ErrorCode, FocusError};
use taskfocus::lifecycle::TaskManager;
use taskfocus::models::{NewTask, Priority, ReorderItem, Task, TaskPatch, TaskStatus};

// ─── helpers ───────────────────────────────────────────────────────

fn manager() -> TaskManager<SqliteStore> {
    manager_with(Config::default())
}

fn manager_with(config: Config) -> TaskManager<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    TaskManager::new(store, config)
}

fn add(m: &mut TaskManager<SqliteStore>, title: &str) -> Task {
    m.create(NewTask::titled(title)).expect("create")
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.title.as_str()).collect()
}

fn positions(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().map(|t| t.position.expect("incomplete task has a position")).collect()
}

fn seed(m: &mut TaskManager<SqliteStore>, n: usize) -> Vec<Task> {
    (1..=n).map(|i| add(m, &format!("T{i}"))).collect()
}

// ─── create ────────────────────────────────────────────────────────

#[test]
fn create_appends_with_increasing_positions() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    assert_eq!(positions(&tasks), vec![1, 2, 3]);
    for t in &tasks {
        assert_eq!(t.status, TaskStatus::Incomplete);
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.completed_at.is_none());
    }
    assert_eq!(titles(&m.list().unwrap()), vec!["T1", "T2", "T3"]);
}

#[test]
fn create_keeps_optional_fields_and_trims() {
    let mut m = manager();
    let due = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
    let task = m
        .create(NewTask {
            title: "  Buy groceries  ".into(),
            priority: Priority::High,
            due_date: Some(due),
            notes: Some("   ".into()),
        })
        .unwrap();
    assert_eq!(task.title, "Buy groceries");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.due_date, Some(due));
    assert_eq!(task.notes, None);

    let stored = m.get(&task.id).unwrap();
    assert_eq!(stored, task);
}

#[test]
fn create_rejects_blank_title() {
    let mut m = manager();
    for title in ["", "   ", "\t\n"] {
        let err = m.create(NewTask::titled(title)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
    assert!(m.list().unwrap().is_empty());
}

#[test]
fn create_after_completing_last_reuses_max_plus_one() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.complete(&tasks[2].id).unwrap();
    let t4 = add(&mut m, "T4");
    assert_eq!(t4.position, Some(3));
    assert_eq!(positions(&m.list().unwrap()), vec![1, 2, 3]);
}

#[test]
fn ids_are_unique() {
    let mut m = manager();
    let tasks = seed(&mut m, 20);
    let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

// ─── update ────────────────────────────────────────────────────────

#[test]
fn update_changes_only_editable_fields() {
    let mut m = manager();
    let tasks = seed(&mut m, 2);
    let due = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
    let updated = m
        .update(
            &tasks[1].id,
            TaskPatch {
                title: Some("Renamed".into()),
                priority: Some(Priority::Low),
                due_date: Some(Some(due)),
                notes: Some(Some("call first".into())),
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.due_date, Some(due));
    assert_eq!(updated.notes.as_deref(), Some("call first"));
    assert_eq!(updated.position, tasks[1].position);
    assert_eq!(updated.status, TaskStatus::Incomplete);
    assert_eq!(updated.created_at, tasks[1].created_at);

    let cleared = m
        .update(
            &tasks[1].id,
            TaskPatch {
                due_date: Some(None),
                notes: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.title, "Renamed");
    assert_eq!(cleared.due_date, None);
    assert_eq!(cleared.notes, None);
}

#[test]
fn update_errors() {
    let mut m = manager();
    let task = add(&mut m, "T1");

    let err = m.update("01NOPE", TaskPatch::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);

    let err = m
        .update(
            &task.id,
            TaskPatch {
                title: Some("  ".into()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(m.get(&task.id).unwrap().title, "T1");
}

#[test]
fn empty_patch_is_a_no_op() {
    let mut m = manager();
    let task = add(&mut m, "T1");
    let same = m.update(&task.id, TaskPatch::default()).unwrap();
    assert_eq!(same, task);
}

// ─── complete / focus batch ────────────────────────────────────────

#[test]
fn complete_then_reveal() {
    let mut m = manager();
    let tasks = seed(&mut m, 4);
    assert_eq!(titles(&m.current_batch().unwrap().tasks), vec!["T1", "T2", "T3"]);

    let done = m.complete(&tasks[0].id).unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.position, None);
    assert!(done.completed_at.is_some());

    let batch = m.current_batch().unwrap();
    assert_eq!(titles(&batch.tasks), vec!["T2", "T3", "T4"]);
    assert_eq!(batch.remaining, 3);
    // Survivors keep their positions; the gap at 1 is fine.
    assert_eq!(positions(&m.list().unwrap()), vec![2, 3, 4]);
}

#[test]
fn complete_is_idempotent_by_default() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    let first = m.complete(&tasks[1].id).unwrap();
    let before = m.list().unwrap();

    let again = m.complete(&tasks[1].id).unwrap();
    assert_eq!(again, first);
    assert_eq!(m.list().unwrap(), before);
    assert_eq!(positions(&before), vec![1, 3]);
}

#[test]
fn complete_can_reject_recompletion() {
    let mut m = manager_with(Config {
        completion_policy: CompletionPolicy::Reject,
        ..Config::default()
    });
    let task = add(&mut m, "T1");
    m.complete(&task.id).unwrap();
    let err = m.complete(&task.id).unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyCompleted);
}

#[test]
fn complete_unknown_task() {
    let mut m = manager();
    let err = m.complete("01UNKNOWN").unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
}

#[test]
fn completed_list_is_most_recent_first() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.complete(&tasks[0].id).unwrap();
    m.complete(&tasks[2].id).unwrap();
    let completed = m.list_completed().unwrap();
    assert_eq!(titles(&completed), vec!["T3", "T1"]);
    assert!(completed.iter().all(|t| t.position.is_none()));
    assert_eq!(titles(&m.list().unwrap()), vec!["T2"]);
}

// ─── defer ─────────────────────────────────────────────────────────

#[test]
fn defer_then_reveal() {
    let mut m = manager();
    let tasks = seed(&mut m, 4);
    let deferred = m.defer(&tasks[0].id).unwrap();
    assert_eq!(deferred.status, TaskStatus::Incomplete);

    let batch = m.current_batch().unwrap();
    assert_eq!(titles(&batch.tasks), vec!["T2", "T3", "T4"]);

    let list = m.list().unwrap();
    assert_eq!(titles(&list), vec!["T2", "T3", "T4", "T1"]);
    let last = list.last().unwrap().position.unwrap();
    assert!(list[..3].iter().all(|t| t.position.unwrap() < last));
    assert_eq!(deferred.position, Some(5));
}

#[test]
fn defer_last_task_stays_last() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.complete(&tasks[1].id).unwrap();
    let deferred = m.defer(&tasks[2].id).unwrap();
    assert_eq!(deferred.position, Some(2));
    assert_eq!(titles(&m.list().unwrap()), vec!["T1", "T3"]);

    let only = add(&mut manager(), "solo");
    assert_eq!(only.position, Some(1));
}

#[test]
fn defer_completed_task_is_invalid_state() {
    let mut m = manager();
    let task = add(&mut m, "T1");
    m.complete(&task.id).unwrap();
    let err = m.defer(&task.id).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);

    let err = m.defer("01MISSING").unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
}

// ─── reorder ───────────────────────────────────────────────────────

#[test]
fn reorder_persists() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    let ids = vec![tasks[2].id.clone(), tasks[0].id.clone(), tasks[1].id.clone()];

    let resorted = m.reorder(&ids).unwrap();
    assert_eq!(titles(&resorted), vec!["T3", "T1", "T2"]);
    assert_eq!(positions(&resorted), vec![1, 2, 3]);

    let reloaded = m.list().unwrap();
    assert_eq!(titles(&reloaded), vec!["T3", "T1", "T2"]);
    assert_eq!(positions(&reloaded), vec![1, 2, 3]);
}

#[test]
fn partial_reorder_appends_omitted_tasks_in_order() {
    let mut m = manager();
    let tasks = seed(&mut m, 5);
    m.complete(&tasks[1].id).unwrap();

    let resorted = m.reorder(&[tasks[4].id.clone(), tasks[2].id.clone()]).unwrap();
    assert_eq!(titles(&resorted), vec!["T5", "T3", "T1", "T4"]);
    assert_eq!(positions(&resorted), vec![1, 2, 3, 4]);
}

#[test]
fn reorder_items_rank_by_requested_position() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    let items = vec![
        ReorderItem { id: tasks[0].id.clone(), position: 3 },
        ReorderItem { id: tasks[1].id.clone(), position: 1 },
        ReorderItem { id: tasks[2].id.clone(), position: 2 },
    ];
    let resorted = m.reorder_items(&items).unwrap();
    assert_eq!(titles(&resorted), vec!["T2", "T3", "T1"]);
    assert_eq!(positions(&resorted), vec![1, 2, 3]);
}

#[test]
fn invalid_reorder_is_rejected_wholly() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.defer(&tasks[0].id).unwrap();
    let before = m.list().unwrap();

    let err = m
        .reorder(&[tasks[2].id.clone(), "01DOESNOTEXIST".into(), tasks[1].id.clone()])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidReorderRequest);
    assert_eq!(m.list().unwrap(), before);
}

#[test]
fn reorder_rejects_completed_and_duplicate() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.complete(&tasks[0].id).unwrap();
    let before = m.list().unwrap();

    let err = m.reorder(&[tasks[0].id.clone(), tasks[1].id.clone()]).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidReorderRequest);

    let err = m.reorder(&[tasks[1].id.clone(), tasks[1].id.clone()]).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidReorderRequest);

    assert_eq!(m.list().unwrap(), before);
}

#[test]
fn empty_reorder_closes_gaps_in_existing_order() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.defer(&tasks[0].id).unwrap();
    m.complete(&tasks[1].id).unwrap();
    assert_eq!(positions(&m.list().unwrap()), vec![3, 4]);

    let listed = m.reorder(&[]).unwrap();
    assert_eq!(titles(&listed), vec!["T3", "T1"]);
    assert_eq!(positions(&listed), vec![1, 2]);
}

#[test]
fn reorder_renumbers_after_gaps() {
    let mut m = manager();
    let tasks = seed(&mut m, 4);
    m.defer(&tasks[0].id).unwrap();
    m.defer(&tasks[1].id).unwrap();
    assert_eq!(positions(&m.list().unwrap()), vec![3, 4, 5, 6]);

    let resorted = m.reorder(&[tasks[1].id.clone(), tasks[0].id.clone()]).unwrap();
    assert_eq!(titles(&resorted), vec!["T2", "T1", "T3", "T4"]);
    assert_eq!(positions(&resorted), vec![1, 2, 3, 4]);
}

// ─── delete ────────────────────────────────────────────────────────

#[test]
fn delete_leaves_other_positions_alone() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.delete(&tasks[1].id).unwrap();
    assert_eq!(positions(&m.list().unwrap()), vec![1, 3]);

    let err = m.get(&tasks[1].id).unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);

    let err = m.delete(&tasks[1].id).unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
}

#[test]
fn delete_completed_task() {
    let mut m = manager();
    let task = add(&mut m, "T1");
    m.complete(&task.id).unwrap();
    m.delete(&task.id).unwrap();
    assert!(m.list_completed().unwrap().is_empty());
}

// ─── batch selection ───────────────────────────────────────────────

#[test]
fn empty_state_is_all_done() {
    let m = manager();
    let batch = m.current_batch().unwrap();
    assert!(batch.all_done());
    assert_eq!(batch.remaining, 0);
}

#[test]
fn batch_smaller_than_size_returns_everything() {
    let mut m = manager();
    seed(&mut m, 2);
    let batch = m.current_batch().unwrap();
    assert_eq!(titles(&batch.tasks), vec!["T1", "T2"]);
    assert!(!batch.all_done());

    let wide = m.batch_of(10).unwrap();
    assert_eq!(wide.tasks.len(), 2);
}

#[test]
fn batch_size_comes_from_config() {
    let mut m = manager_with(Config {
        batch_size: 2,
        ..Config::default()
    });
    seed(&mut m, 5);
    assert_eq!(titles(&m.current_batch().unwrap().tasks), vec!["T1", "T2"]);
    assert_eq!(titles(&m.batch_of(4).unwrap().tasks), vec!["T1", "T2", "T3", "T4"]);

    let err = m.batch_of(0).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn working_through_the_batch_until_done() {
    let mut m = manager();
    seed(&mut m, 5);
    let mut finished = Vec::new();
    loop {
        let batch = m.current_batch().unwrap();
        if batch.all_done() {
            break;
        }
        let first = &batch.tasks[0];
        finished.push(first.title.clone());
        m.complete(&first.id).unwrap();
    }
    assert_eq!(finished, vec!["T1", "T2", "T3", "T4", "T5"]);
    assert_eq!(m.list_completed().unwrap().len(), 5);
}

// ─── resolve ───────────────────────────────────────────────────────

#[test]
fn resolve_by_unique_prefix() {
    let mut m = manager();
    let task = add(&mut m, "T1");
    let found = m.resolve(&task.id[..20]).unwrap();
    assert_eq!(found.id, task.id);

    let err = m.resolve("zzz").unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
    let err = m.resolve("").unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
}

#[test]
fn resolve_ambiguous_prefix() {
    let mut m = manager();
    let a = add(&mut m, "A");
    let b = add(&mut m, "B");
    let common = a
        .id
        .chars()
        .zip(b.id.chars())
        .take_while(|(x, y)| x == y)
        .count();
    if common > 0 {
        let err = m.resolve(&a.id[..common]).unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousRef);
    }
}

// ─── storage failures ──────────────────────────────────────────────

/// Delegates to a real store, but the selected writes land partially and
/// then report the disk as gone.
struct FlakyStore {
    inner: SqliteStore,
    fail_reposition: bool,
    fail_update: bool,
}

impl FlakyStore {
    fn new(fail_reposition: bool, fail_update: bool) -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("in-memory store"),
            fail_reposition,
            fail_update,
        }
    }
}

impl TaskStore for FlakyStore {
    fn get(&self, id: &str) -> Result<Option<Task>, FocusError> {
        self.inner.get(id)
    }

    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Task>, FocusError> {
        self.inner.find_by_prefix(prefix)
    }

    fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, FocusError> {
        self.inner.list_by_status(status)
    }

    fn insert(&self, task: &Task) -> Result<(), FocusError> {
        self.inner.insert(task)
    }

    fn update(&self, task: &Task) -> Result<(), FocusError> {
        self.inner.update(task)?;
        if self.fail_update {
            return Err(FocusError::storage("disk unavailable"));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, FocusError> {
        self.inner.delete(id)
    }

    fn max_position(&self) -> Result<Option<i64>, FocusError> {
        self.inner.max_position()
    }

    fn max_position_excluding(&self, id: &str) -> Result<Option<i64>, FocusError> {
        self.inner.max_position_excluding(id)
    }

    fn reposition(&self, moves: &[(String, i64)]) -> Result<(), FocusError> {
        if self.fail_reposition {
            self.inner.reposition(&moves[..moves.len().min(1)])?;
            return Err(FocusError::storage("disk unavailable"));
        }
        self.inner.reposition(moves)
    }

    fn begin(&self) -> Result<(), FocusError> {
        self.inner.begin()
    }

    fn commit(&self) -> Result<(), FocusError> {
        self.inner.commit()
    }

    fn rollback(&self) -> Result<(), FocusError> {
        self.inner.rollback()
    }
}

fn flaky_manager(fail_reposition: bool, fail_update: bool) -> (TaskManager<FlakyStore>, Vec<Task>) {
    let mut m = TaskManager::new(FlakyStore::new(fail_reposition, fail_update), Config::default());
    let tasks = (1..=3)
        .map(|i| m.create(NewTask::titled(format!("T{i}"))).expect("create"))
        .collect();
    (m, tasks)
}

#[test]
fn failed_reorder_rolls_back_partial_moves() {
    let (mut m, tasks) = flaky_manager(true, false);
    m.defer(&tasks[0].id).unwrap();
    let before = m.list().unwrap();
    assert_eq!(positions(&before), vec![2, 3, 4]);

    // T1 moves into the free slot 1 before the store fails.
    let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    let err = m.reorder(&ids).unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageUnavailable);

    let after = m.list().unwrap();
    assert_eq!(after, before);
    assert_eq!(titles(&after), vec!["T2", "T3", "T1"]);
}

#[test]
fn failed_complete_rolls_back() {
    let (mut m, tasks) = flaky_manager(false, true);
    let before = m.list().unwrap();

    let err = m.complete(&tasks[0].id).unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageUnavailable);

    assert_eq!(m.list().unwrap(), before);
    assert!(m.list_completed().unwrap().is_empty());
    assert_eq!(m.get(&tasks[0].id).unwrap().status, TaskStatus::Incomplete);
}

#[test]
fn failed_defer_rolls_back() {
    let (mut m, tasks) = flaky_manager(false, true);
    let before = m.list().unwrap();

    let err = m.defer(&tasks[0].id).unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageUnavailable);

    assert_eq!(m.list().unwrap(), before);
    assert_eq!(titles(&m.current_batch().unwrap().tasks), vec!["T1", "T2", "T3"]);
}

#[test]
fn defer_ignores_own_position_when_finding_the_end() {
    let mut m = manager();
    let tasks = seed(&mut m, 3);
    m.defer(&tasks[1].id).unwrap();
    // T2 now sits at 4; the highest slot among the others is still 3.
    let deferred = m.defer(&tasks[1].id).unwrap();
    assert_eq!(deferred.position, Some(4));
    assert_eq!(titles(&m.list().unwrap()), vec!["T1", "T3", "T2"]);
}
