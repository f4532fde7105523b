use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

use crate::client::TaskApi;
use crate::controller::{Confirm, Confirmation, Controller, Overlay};
use crate::tasks::Task;
use crate::view;


const HELP: &str = "\
commands:
  list                 list every task and clear the search
  refresh              reload using the current search
  search [query]       search tasks by name; empty lists everything
  create               create a task
  run <id>             run a task's command
  output <id>          show a task's last output
  delete <id>          delete a task
  close                close the output view
  help                 show this help
  quit                 leave the shell
";


/// Line-oriented stdin for the shell's command prompt.
pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    pub async fn prompt(&self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        self.lines.lock().await.next_line().await
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}


/// Asks confirmations with a dialoguer yes/no prompt. Anything but an
/// explicit yes declines.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dialog;

#[async_trait]
impl Confirm for Dialog {
    async fn confirm(&self, confirmation: &Confirmation) -> bool {
        let prompt = prompt_text(confirmation);
        let answer = interact(move || {
            dialoguer::Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(answer) => answer,
            Err(err) => {
                warn!("confirmation prompt failed: {}", err);
                false
            }
        }
    }
}


fn prompt_text(confirmation: &Confirmation) -> String {
    format!("{} {}", confirmation.title, confirmation.content)
}


// dialoguer blocks on the terminal, so prompts run off the async workers.
async fn interact<T, F>(prompt: F) -> std::io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)
}


fn parse(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}


pub async fn run<A: TaskApi, C: Confirm>(
    controller: &Controller<A, C>,
    terminal: &Terminal
) -> std::io::Result<()> {
    controller.load_all().await;
    let mut shown = Overlay::Closed;
    render(controller, &mut shown).await;

    while let Some(line) = terminal.prompt("jobman> ").await? {
        match parse(&line) {
            ("", _) => continue,
            ("quit" | "exit", _) => break,
            ("help", _) => {
                print!("{}", HELP);
                continue;
            }
            ("list", _) => controller.search("").await,
            ("refresh", _) => controller.refresh().await,
            ("search", query) => controller.search(query).await,
            ("create", _) => create(controller).await?,
            ("close", _) => controller.close_output().await,
            ("run", id) => {
                if let Some(task) = visible(controller, id).await {
                    controller.run(id, &task.command).await;
                }
            }
            ("output", id) => {
                if let Some(task) = visible(controller, id).await {
                    shown = Overlay::Closed;
                    controller.view_last_output(&task).await;
                }
            }
            ("delete", "") => println!("usage: delete <id>"),
            ("delete", id) => {
                controller.delete(id).await;
            }
            (other, _) => {
                println!("unknown command: {} (try `help`)", other);
                continue;
            }
        }
        render(controller, &mut shown).await;
    }

    Ok(())
}


async fn visible<A: TaskApi, C: Confirm>(
    controller: &Controller<A, C>,
    id: &str
) -> Option<Task> {
    let task = controller.state().await.tasks
        .into_iter()
        .find(|task| task.id.as_deref() == Some(id));
    if task.is_none() {
        println!("no task with id {:?} in the current view", id);
    }
    task
}


async fn create<A: TaskApi, C: Confirm>(controller: &Controller<A, C>) -> std::io::Result<()> {
    controller.open_create_form().await;
    loop {
        let form = controller.state().await.form;
        let name = ask("Name", form.name).await?;
        let owner = ask("Owner", form.owner).await?;
        let command = ask("Command", form.command).await?;

        if controller.create(&name, &owner, &command).await.is_some() {
            return Ok(());
        }

        let state = controller.state().await;
        if !state.form.invalid.is_empty() {
            println!("{}", view::render_invalid(&state.form.invalid));
        }
        for notification in controller.take_notifications().await {
            println!("{}", view::render_notification(&notification));
        }

        let again = interact(|| {
            dialoguer::Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Try again?")
                .default(false)
                .interact()
        })
        .await?;
        if !again {
            controller.close_create_form().await;
            return Ok(());
        }
    }
}


/// Reads one form field, offering the current value as the default.
async fn ask(label: &'static str, current: String) -> std::io::Result<String> {
    interact(move || {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(label)
            .allow_empty(true);
        if !current.is_empty() {
            input = input.default(current);
        }
        input.interact_text()
    })
    .await
}


async fn render<A: TaskApi, C: Confirm>(controller: &Controller<A, C>, shown: &mut Overlay) {
    for notification in controller.take_notifications().await {
        println!("{}", view::render_notification(&notification));
    }

    let state = controller.state().await;
    if state.overlay != *shown {
        if let Overlay::Open(ref output) = state.overlay {
            print!("{}", view::render_output(output));
        }
        *shown = state.overlay.clone();
    }
    print!("{}", view::render_tasks(&state.tasks, state.running.as_deref()));
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("  run  abc "), ("run", "abc"));
        assert_eq!(parse("search"), ("search", ""));
        assert_eq!(parse("search deploy prod"), ("search", "deploy prod"));
        assert_eq!(parse(""), ("", ""));
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(
            prompt_text(&Confirmation::delete()),
            "Delete Task? This action cannot be undone."
        );
        assert!(prompt_text(&Confirmation::run("ls")).contains("`ls`"));
    }

    #[tokio::test]
    async fn test_interact_runs_off_the_runtime() {
        assert_eq!(interact(|| Ok(7)).await.unwrap(), 7);

        let err = interact::<bool, _>(|| {
            Err(std::io::Error::new(std::io::ErrorKind::NotConnected, "no tty").into())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no tty"));
    }
}
