pub mod client;
pub mod command;
pub mod controller;
mod error;
mod process;
pub mod server;
pub mod shell;
mod tasks;
pub mod view;

pub use client::{Client, TaskApi};
pub use command::{Cli, Command};
pub use controller::{AutoConfirm, Confirm, Confirmation, Controller, ViewState};
pub use error::Error;
pub use process::Process;
pub use server::{serve, Server};
pub use tasks::{CreateTask, Execution, Task};
