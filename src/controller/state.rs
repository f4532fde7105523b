use chrono::{DateTime, Utc};

use crate::tasks::{Execution, Task};


pub const NO_EXECUTIONS: &str = "No executions yet";


#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewState {
    pub tasks: Vec<Task>,
    pub query: String,
    pub loading: bool,
    pub searching: bool,
    pub running: Option<String>,
    pub overlay: Overlay,
    pub form: CreateForm,
    pub notifications: Vec<Notification>,
    pub epoch: u64,
}

impl ViewState {
    pub fn active_query(&self) -> Option<&str> {
        match self.query.trim() {
            "" => None,
            query => Some(query),
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| n.level == Level::Error)
    }
}


#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Overlay {
    #[default]
    Closed,
    Open(OutputView),
}


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputView {
    pub started: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,
    pub text: String,
}

impl OutputView {
    pub fn from_execution(execution: &Execution) -> Self {
        Self {
            started: Some(execution.start_time),
            ended: Some(execution.end_time),
            text: execution.output.clone(),
        }
    }

    pub fn last_of(task: &Task) -> Self {
        match task.last_execution() {
            Some(execution) => Self::from_execution(execution),
            None => Self {
                started: None,
                ended: None,
                text: NO_EXECUTIONS.to_string(),
            },
        }
    }
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Name,
    Owner,
    Command,
}


#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateForm {
    pub open: bool,
    pub name: String,
    pub owner: String,
    pub command: String,
    pub invalid: Vec<Field>,
}

impl CreateForm {
    /// Fields that are empty once surrounding whitespace is dropped.
    pub fn validate(&self) -> Vec<Field> {
        [
            (Field::Name, &self.name),
            (Field::Owner, &self.owner),
            (Field::Command, &self.command),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Success,
    Error,
}


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fetch {
    All,
    Search,
}


#[derive(Clone, Debug)]
pub enum Event {
    QueryChanged(String),
    FetchStarted(Fetch),
    FetchSucceeded { epoch: u64, tasks: Vec<Task> },
    FetchFailed { epoch: u64, kind: Fetch, message: String },
    FormOpened,
    FormSubmitted { name: String, owner: String, command: String },
    FormInvalid(Vec<Field>),
    FormClosed,
    Created,
    CreateFailed(String),
    Deleted,
    DeleteFailed(String),
    RunStarted(String),
    RunSucceeded(Execution),
    RunFailed(String),
    RunFinished,
    OutputShown(OutputView),
    OutputClosed,
    NotificationsCleared,
}


pub fn reduce(mut state: ViewState, event: Event) -> ViewState {
    match event {
        Event::QueryChanged(query) => {
            state.query = query;
        }
        Event::FetchStarted(kind) => {
            state.epoch += 1;
            match kind {
                Fetch::All => state.loading = true,
                Fetch::Search => state.searching = true,
            }
        }
        Event::FetchSucceeded { epoch, tasks } => {
            if epoch == state.epoch {
                state.tasks = tasks;
                state.loading = false;
                state.searching = false;
            }
        }
        Event::FetchFailed { epoch, kind, message } => {
            if epoch == state.epoch {
                state.loading = false;
                state.searching = false;
                let message = match kind {
                    Fetch::All => format!("Failed to load tasks: {}", message),
                    Fetch::Search => format!("Search failed: {}", message),
                };
                state.notifications.push(Notification::error(message));
            }
        }
        Event::FormOpened => {
            state.form.open = true;
        }
        Event::FormSubmitted { name, owner, command } => {
            state.form.open = true;
            state.form.name = name;
            state.form.owner = owner;
            state.form.command = command;
            state.form.invalid.clear();
        }
        Event::FormInvalid(fields) => {
            state.form.invalid = fields;
        }
        Event::FormClosed => {
            state.form = CreateForm::default();
        }
        Event::Created => {
            state.form = CreateForm::default();
            state.notifications.push(Notification::success("Task created"));
        }
        Event::CreateFailed(message) => {
            state.notifications.push(
                Notification::error(format!("Create failed: {}", message))
            );
        }
        Event::Deleted => {
            state.notifications.push(Notification::success("Task deleted"));
        }
        Event::DeleteFailed(message) => {
            state.notifications.push(
                Notification::error(format!("Delete failed: {}", message))
            );
        }
        Event::RunStarted(id) => {
            state.running = Some(id);
        }
        Event::RunSucceeded(execution) => {
            state.overlay = Overlay::Open(OutputView::from_execution(&execution));
            state.notifications.push(Notification::success("Execution completed"));
        }
        Event::RunFailed(message) => {
            state.notifications.push(
                Notification::error(format!("Run failed: {}", message))
            );
        }
        Event::RunFinished => {
            state.running = None;
        }
        Event::OutputShown(view) => {
            state.overlay = Overlay::Open(view);
        }
        Event::OutputClosed => {
            state.overlay = Overlay::Closed;
        }
        Event::NotificationsCleared => {
            state.notifications.clear();
        }
    }

    state
}


#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, executions: Vec<Execution>) -> Task {
        Task {
            id: Some(id.to_string()),
            name: format!("task-{}", id),
            owner: "alice".to_string(),
            command: "echo hi".to_string(),
            task_executions: executions,
        }
    }

    fn execution(output: &str) -> Execution {
        Execution {
            start_time: Utc::now(),
            end_time: Utc::now(),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_fetch_applies_latest_epoch() {
        let state = reduce(ViewState::default(), Event::FetchStarted(Fetch::All));
        assert!(state.loading);
        assert_eq!(state.epoch, 1);

        let state = reduce(state, Event::FetchSucceeded {
            epoch: 1,
            tasks: vec![task("a", vec![])],
        });
        assert!(!state.loading);
        assert_eq!(state.tasks.len(), 1);
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let state = reduce(ViewState::default(), Event::FetchStarted(Fetch::Search));
        let state = reduce(state, Event::FetchStarted(Fetch::Search));

        let state = reduce(state, Event::FetchSucceeded {
            epoch: 2,
            tasks: vec![task("new", vec![])],
        });
        let state = reduce(state, Event::FetchSucceeded {
            epoch: 1,
            tasks: vec![task("old", vec![])],
        });
        let state = reduce(state, Event::FetchFailed {
            epoch: 1,
            kind: Fetch::Search,
            message: "late".to_string(),
        });

        assert_eq!(state.tasks[0].id.as_deref(), Some("new"));
        assert!(state.notifications.is_empty());
        assert!(!state.searching);
    }

    #[test]
    fn test_failed_fetch_keeps_collection() {
        let mut state = ViewState::default();
        state.tasks = vec![task("a", vec![])];

        let state = reduce(state, Event::FetchStarted(Fetch::All));
        let state = reduce(state, Event::FetchFailed {
            epoch: 1,
            kind: Fetch::All,
            message: "connection refused".to_string(),
        });

        assert_eq!(state.tasks.len(), 1);
        assert!(!state.loading);
        assert_eq!(
            state.notifications,
            vec![Notification::error("Failed to load tasks: connection refused")]
        );
    }

    #[test]
    fn test_form_validation_trims() {
        let form = CreateForm {
            open: true,
            name: "  ".to_string(),
            owner: "alice".to_string(),
            command: "".to_string(),
            invalid: vec![],
        };
        assert_eq!(form.validate(), vec![Field::Name, Field::Command]);
    }

    #[test]
    fn test_create_failure_keeps_form() {
        let state = reduce(ViewState::default(), Event::FormOpened);
        let state = reduce(state, Event::FormSubmitted {
            name: "t1".to_string(),
            owner: "alice".to_string(),
            command: "echo hi".to_string(),
        });
        let state = reduce(state, Event::CreateFailed("500".to_string()));

        assert!(state.form.open);
        assert_eq!(state.form.name, "t1");

        let state = reduce(state, Event::Created);
        assert_eq!(state.form, CreateForm::default());
    }

    #[test]
    fn test_running_marker_lifecycle() {
        let state = reduce(ViewState::default(), Event::RunStarted("a".to_string()));
        assert_eq!(state.running.as_deref(), Some("a"));

        let state = reduce(state, Event::RunFailed("boom".to_string()));
        assert_eq!(state.running.as_deref(), Some("a"));

        let state = reduce(state, Event::RunFinished);
        assert!(state.running.is_none());
    }

    #[test]
    fn test_overlay_closes_only_explicitly() {
        let state = reduce(ViewState::default(), Event::RunSucceeded(execution("hi\n")));
        assert!(matches!(state.overlay, Overlay::Open(ref view) if view.text == "hi\n"));

        let state = reduce(state, Event::FetchStarted(Fetch::All));
        let state = reduce(state, Event::FetchSucceeded { epoch: 1, tasks: vec![] });
        let state = reduce(state, Event::Deleted);
        assert!(matches!(state.overlay, Overlay::Open(_)));

        let state = reduce(state, Event::OutputClosed);
        assert_eq!(state.overlay, Overlay::Closed);
    }

    #[test]
    fn test_last_output_view() {
        let view = OutputView::last_of(&task("a", vec![]));
        assert_eq!(view.text, NO_EXECUTIONS);
        assert!(view.started.is_none());

        let view = OutputView::last_of(
            &task("a", vec![execution("one\n"), execution("two\n")])
        );
        assert_eq!(view.text, "two\n");
        assert!(view.ended.is_some());
    }
}
