//! Terminal front end for mytodos.
//!
//! # Responsibility
//! - Load configuration, start logging, and open the task store.
//! - Feed stdin commands to the lifecycle controller and drive its
//!   reminder ticks while waiting for input.

mod commands;
mod terminal;

use commands::{Command, CommandError};
use log::{debug, error, info};
use mytodos_core::db::open_db;
use mytodos_core::{
    init_logging, SqliteTaskStore, SystemClock, TaskId, TaskStore, TodoConfig, TodoController,
};
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use terminal::{TerminalNotifier, TerminalPresenter};

type Controller<S> = TodoController<S, TerminalPresenter, TerminalNotifier, SystemClock>;

fn main() {
    dotenv::dotenv().ok();

    if let Err(err) = run() {
        error!("event=app_exit module=cli status=error error={err}");
        eprintln!("mytodos: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = TodoConfig::from_env()?;
    if let Err(err) = init_logging(&config.logging) {
        eprintln!("mytodos: logging disabled: {err}");
    }
    info!(
        "event=app_start module=cli status=ok version={}",
        mytodos_core::core_version()
    );

    let conn = open_db(&config.db_path)?;
    let store = SqliteTaskStore::try_new(&conn)?;
    let mut controller = TodoController::new(
        store,
        TerminalPresenter::new(),
        TerminalNotifier::detect(),
        SystemClock,
        config.feedback.clone(),
    );
    println!("mytodos {} (type `help`)", mytodos_core::core_version());
    controller.init();

    let lines = spawn_stdin_reader();
    loop {
        let wait = controller
            .time_until_next_reminder()
            .map_or(config.tick_interval, |until| until.min(config.tick_interval));

        match lines.recv_timeout(wait) {
            Ok(line) => match commands::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => dispatch(&mut controller, command),
                Err(CommandError::Empty) => {}
                Err(err) => eprintln!("{err}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        controller.tick();
    }

    controller.shutdown();
    info!("event=app_exit module=cli status=ok");
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn dispatch<S: TaskStore>(controller: &mut Controller<S>, command: Command) {
    match command {
        Command::Add(text) => {
            // Duplicates already raised a popup; blank input stays silent.
            if let Err(err) = controller.add_task(&text) {
                debug!("event=cli_add module=cli status=rejected error={err}");
            }
        }
        Command::Done(position) => with_task(controller, position, |c, id| {
            c.complete_task(&id);
        }),
        Command::Remove(position) => with_task(controller, position, |c, id| {
            c.delete_task(&id);
        }),
        Command::Star(position) => with_task(controller, position, |c, id| {
            c.prioritize_task(&id);
        }),
        Command::Edit(position, text) => with_task(controller, position, |c, id| {
            c.edit_task(&id, &text);
        }),
        Command::Due(position, raw) => with_task(controller, position, |c, id| {
            if let Err(err) = c.set_deadline(&id, &raw) {
                eprintln!("{err}");
            }
        }),
        Command::Note(position, details) => with_task(controller, position, |c, id| {
            c.set_details(&id, &details);
        }),
        Command::Find(query) => {
            controller.search_tasks(&query);
        }
        Command::List => controller.show_all(),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

fn with_task<S: TaskStore>(
    controller: &mut Controller<S>,
    position: usize,
    action: impl FnOnce(&mut Controller<S>, TaskId),
) {
    match controller.presenter().task_at(position).cloned() {
        Some(task_id) => action(controller, task_id),
        None => eprintln!("no task at position {position}"),
    }
}
