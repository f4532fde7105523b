use async_trait::async_trait;
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::TaskApi;
use crate::tasks::{CreateTask, Execution, Task};

mod state;

pub use state::{
    reduce, CreateForm, Event, Fetch, Field, Level, Notification, OutputView,
    Overlay, ViewState, NO_EXECUTIONS,
};


/// A yes/no question put to the user before an action goes out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Confirmation {
    pub title: String,
    pub content: String,
    pub danger: bool,
}

impl Confirmation {
    pub fn delete() -> Self {
        Self {
            title: "Delete Task?".to_string(),
            content: "This action cannot be undone.".to_string(),
            danger: true,
        }
    }

    pub fn run(command: &str) -> Self {
        Self {
            title: "Run Command?".to_string(),
            content: format!(
                "The command `{}` does not look like a simple `echo`. Proceed anyway?",
                command
            ),
            danger: false,
        }
    }
}


#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, confirmation: &Confirmation) -> bool;
}

#[async_trait]
impl<T: Confirm + ?Sized> Confirm for Arc<T> {
    async fn confirm(&self, confirmation: &Confirmation) -> bool {
        (**self).confirm(confirmation).await
    }
}


/// Answers every confirmation with a fixed value.
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _confirmation: &Confirmation) -> bool {
        self.0
    }
}


static SAFE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*echo\s").expect("safe command pattern is valid")
});


/// Whether `command` starts with the word `echo` followed by whitespace.
///
/// This only decides if the run prompt is shown. It does not restrict what
/// the backend executes.
pub fn is_safe_command(command: &str) -> bool {
    SAFE_COMMAND.is_match(command)
}


pub struct Controller<A, C> {
    api: A,
    confirm: C,
    state: Mutex<ViewState>,
}

impl<A: TaskApi, C: Confirm> Controller<A, C> {
    pub fn new(api: A, confirm: C) -> Self {
        Self {
            api,
            confirm,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub async fn state(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    // The lock is released before any request is awaited.
    async fn dispatch(&self, event: Event) -> u64 {
        let mut state = self.state.lock().await;
        let current = std::mem::take(&mut *state);
        *state = reduce(current, event);
        state.epoch
    }

    pub async fn load_all(&self) {
        let epoch = self.dispatch(Event::FetchStarted(Fetch::All)).await;
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!("loaded {} tasks (epoch {})", tasks.len(), epoch);
                self.dispatch(Event::FetchSucceeded { epoch, tasks }).await;
            }
            Err(err) => {
                warn!("failed to load tasks: {}", err);
                self.dispatch(Event::FetchFailed {
                    epoch,
                    kind: Fetch::All,
                    message: err.to_string(),
                })
                .await;
            }
        }
    }

    pub async fn search(&self, query: &str) {
        self.dispatch(Event::QueryChanged(query.to_string())).await;
        match query.trim() {
            "" => self.load_all().await,
            query => self.find(query).await,
        }
    }

    /// Re-runs the active search, or lists everything when there is none.
    pub async fn refresh(&self) {
        let query = self.state.lock().await.active_query().map(str::to_string);
        match query {
            Some(query) => self.find(&query).await,
            None => self.load_all().await,
        }
    }

    async fn find(&self, query: &str) {
        let epoch = self.dispatch(Event::FetchStarted(Fetch::Search)).await;
        match self.api.find_tasks_by_name(query).await {
            Ok(tasks) => {
                self.dispatch(Event::FetchSucceeded { epoch, tasks }).await;
            }
            Err(err) if err.is_not_found() => {
                debug!("no tasks match {:?}", query);
                self.dispatch(Event::FetchSucceeded { epoch, tasks: vec![] }).await;
            }
            Err(err) => {
                warn!("search for {:?} failed: {}", query, err);
                self.dispatch(Event::FetchFailed {
                    epoch,
                    kind: Fetch::Search,
                    message: err.to_string(),
                })
                .await;
            }
        }
    }

    pub async fn open_create_form(&self) {
        self.dispatch(Event::FormOpened).await;
    }

    pub async fn close_create_form(&self) {
        self.dispatch(Event::FormClosed).await;
    }

    pub async fn create(&self, name: &str, owner: &str, command: &str) -> Option<Task> {
        self.dispatch(Event::FormSubmitted {
            name: name.to_string(),
            owner: owner.to_string(),
            command: command.to_string(),
        })
        .await;

        let invalid = self.state.lock().await.form.validate();
        if !invalid.is_empty() {
            debug!("create form invalid: {:?}", invalid);
            self.dispatch(Event::FormInvalid(invalid)).await;
            return None;
        }

        let request = CreateTask::new(
            name.trim().to_string(),
            owner.trim().to_string(),
            command.trim().to_string(),
        );
        match self.api.create_task(&request).await {
            Ok(task) => {
                info!("created task {:?}", task.id);
                self.dispatch(Event::Created).await;
                self.refresh().await;
                Some(task)
            }
            Err(err) => {
                warn!("create failed: {}", err);
                self.dispatch(Event::CreateFailed(err.to_string())).await;
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        if !self.confirm.confirm(&Confirmation::delete()).await {
            debug!("delete of {} declined", id);
            return false;
        }

        match self.api.delete_task(id).await {
            Ok(()) => {
                info!("deleted task {}", id);
                self.dispatch(Event::Deleted).await;
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!("delete of {} failed: {}", id, err);
                self.dispatch(Event::DeleteFailed(err.to_string())).await;
                false
            }
        }
    }

    pub async fn run(&self, id: &str, command: &str) -> Option<Execution> {
        if !is_safe_command(command)
            && !self.confirm.confirm(&Confirmation::run(command)).await
        {
            debug!("run of {} declined", id);
            return None;
        }

        self.dispatch(Event::RunStarted(id.to_string())).await;
        let result = match self.api.run_task(id).await {
            Ok(execution) => {
                info!("task {} finished at {}", id, execution.end_time);
                self.dispatch(Event::RunSucceeded(execution.clone())).await;
                self.refresh().await;
                Some(execution)
            }
            Err(err) => {
                warn!("run of {} failed: {}", id, err);
                self.dispatch(Event::RunFailed(err.to_string())).await;
                None
            }
        };

        self.dispatch(Event::RunFinished).await;
        result
    }

    pub async fn view_last_output(&self, task: &Task) {
        self.dispatch(Event::OutputShown(OutputView::last_of(task))).await;
    }

    pub async fn close_output(&self) {
        self.dispatch(Event::OutputClosed).await;
    }

    /// Returns pending notifications and clears them from the state.
    pub async fn take_notifications(&self) -> Vec<Notification> {
        let mut state = self.state.lock().await;
        let notifications = state.notifications.clone();
        let current = std::mem::take(&mut *state);
        *state = reduce(current, Event::NotificationsCleared);
        notifications
    }
}
