use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{KeyValueStore, keys};
use crate::surface::{Row, Surface, TaskRow};

pub const TASK_LIST_ID: &str = "taskList";
pub const EMPTY_PLACEHOLDER: &str = "No tasks yet. Add your first task!";
pub const CLEAR_ALL_PROMPT: &str = "Clear all tasks?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub done: bool,
}

/// Ordered task collection with positional identity. Every mutation persists
/// the whole serialized collection, then re-renders, in that order, so the
/// rendered view never reflects unpersisted state.
#[derive(Debug, Default)]
pub struct TaskListController {
    tasks: Vec<Task>,
}

impl TaskListController {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let tasks = match store.get(keys::TASKS) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(tasks) => tasks,
                Err(error) => {
                    warn!(%error, "discarding malformed task list");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a task with the trimmed name. A trimmed-empty name is rejected
    /// as a no-op.
    pub fn add(
        &mut self,
        name: &str,
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
    ) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            debug!("rejecting empty task name");
            return false;
        }

        self.tasks.push(Task {
            name: trimmed.to_string(),
            done: false,
        });
        self.persist(store);
        self.render(surface);
        true
    }

    /// Sets the done flag at `index`.
    ///
    /// Panics if `index` is out of range: the rendered view and the backing
    /// collection must stay index-synchronized, so a stale index is a caller
    /// defect rather than a recoverable condition.
    pub fn toggle(
        &mut self,
        index: usize,
        done: bool,
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
    ) {
        self.tasks[index].done = done;
        self.persist(store);
        self.render(surface);
    }

    /// Deletes the task at `index`; subsequent indices shift down.
    ///
    /// Panics if `index` is out of range, same contract as [`Self::toggle`].
    pub fn remove(
        &mut self,
        index: usize,
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
    ) {
        self.tasks.remove(index);
        self.persist(store);
        self.render(surface);
    }

    /// Retains only undone tasks, preserving relative order.
    pub fn clear_done(&mut self, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) {
        self.tasks.retain(|task| !task.done);
        self.persist(store);
        self.render(surface);
    }

    /// Empties the collection, gated on the surface's blocking confirmation
    /// prompt. A decline aborts with no state change at all.
    pub fn clear_all(&mut self, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) -> bool {
        if !surface.confirm(CLEAR_ALL_PROMPT) {
            return false;
        }

        self.tasks.clear();
        self.persist(store);
        self.render(surface);
        true
    }

    /// Row descriptors for the current collection: one placeholder row when
    /// empty, one task row per element otherwise.
    pub fn rows(&self) -> Vec<Row> {
        if self.tasks.is_empty() {
            return vec![Row::Placeholder(EMPTY_PLACEHOLDER.to_string())];
        }

        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                Row::Task(TaskRow {
                    index,
                    name: task.name.clone(),
                    done: task.done,
                })
            })
            .collect()
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.replace_rows(TASK_LIST_ID, self.rows());
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(&self.tasks) {
            Ok(encoded) => {
                if let Err(error) = store.set(keys::TASKS, &encoded) {
                    warn!(%error, "failed to persist tasks, continuing with in-memory state");
                }
            }
            Err(error) => warn!(%error, "failed to encode tasks"),
        }
    }
}
