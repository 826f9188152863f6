mod input;

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use mdpad_config::Config;
use mdpad_editor::{
    CommandResult, DocumentController, Notification, NotificationLevel, SaveOutcome, SaveRequest,
};
use mdpad_logger::LogLevel;
use mdpad_persistence::FsPersistence;

use input::Input;

/// How often the event loop ticks while waiting for input.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Longest wait at exit for a running save.
const EXIT_SAVE_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    let min_level = config
        .logging
        .min_level
        .parse::<LogLevel>()
        .unwrap_or(LogLevel::Info);
    mdpad_logger::init(
        config.log_file_path(),
        config.logging.max_entries,
        min_level,
    );
    log::info!("mdpad started");

    let notifier = Box::new(|notification: Notification| match notification.level {
        NotificationLevel::Info => println!("{}", notification.message),
        NotificationLevel::Warning | NotificationLevel::Error => {
            eprintln!("{}", notification.message)
        }
    });
    let mut controller = DocumentController::new(FsPersistence, &config, notifier);

    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        let opened = if mdpad_persistence::file_exists(&path) {
            controller.open(&path, Instant::now()).map(|_| ())
        } else {
            // New file: create it so later saves have a target
            controller.save_as(path, Instant::now());
            Ok(())
        };
        if let Err(e) = opened {
            eprintln!("{:#}", e);
        }
    }
    println!("{} (:w save, :e open, :undo, :redo, :p print, :q quit)", controller.title());

    let lines = spawn_stdin_reader();
    let result = run(&mut controller, &lines);

    // Shutdown discards an unfinished save, so let it land first
    if !controller.finish_saving(EXIT_SAVE_TIMEOUT) {
        eprintln!("Save of {} did not finish", controller.title());
    }
    if controller.is_dirty() {
        eprintln!("Unsaved changes discarded");
    }
    controller.shutdown();
    log::info!("mdpad stopped");
    result
}

/// Read stdin on a background thread so the main loop keeps ticking.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run(
    controller: &mut DocumentController<FsPersistence>,
    lines: &mpsc::Receiver<String>,
) -> Result<()> {
    loop {
        match lines.recv_timeout(TICK_INTERVAL) {
            Ok(line) => {
                if !handle_line(controller, &line)? {
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        if let Some(SaveOutcome::Saved { ticket, .. }) = controller.tick(Instant::now()) {
            log::debug!("Save of revision {} finished", ticket.revision);
        }
    }
}

/// Returns `false` when the user asked to quit.
fn handle_line(controller: &mut DocumentController<FsPersistence>, line: &str) -> Result<bool> {
    let now = Instant::now();
    let mut stdout = io::stdout().lock();

    match input::parse(line) {
        Input::Append(text) => {
            let mut content = controller.content().to_string();
            content.push_str(&text);
            content.push('\n');
            controller.edit(content, now);
        }
        Input::Command(command) => match controller.handle_command(command, now) {
            CommandResult::ContentReplaced(content) => write!(stdout, "{}", content)?,
            CommandResult::Save(SaveRequest::Started) => {
                writeln!(stdout, "Saving {}...", controller.title())?
            }
            _ => {}
        },
        Input::Print => {
            write!(stdout, "{}", controller.content())?;
            if controller.is_dirty() {
                writeln!(stdout, "[modified]")?;
            }
        }
        Input::Stats => {
            let stats = controller.stats();
            let history = controller.history_stats();
            writeln!(
                stdout,
                "{}: {} lines, {} words, {} chars, {} blocks; undo {}, redo {}",
                controller.title(),
                stats.lines,
                stats.words,
                stats.chars,
                controller.blocks().len(),
                history.undo_count,
                history.redo_count
            )?;
            if controller.check_external_modification() {
                writeln!(stdout, "Warning: file changed on disk")?;
            }
        }
        Input::Log => {
            for entry in mdpad_logger::get_entries() {
                writeln!(
                    stdout,
                    "{} [{}] {}",
                    entry.timestamp,
                    entry.level.to_str(),
                    entry.message
                )?;
            }
        }
        Input::Quit => return Ok(false),
        Input::Unknown(line) => writeln!(stdout, "Unknown command: {}", line)?,
    }

    Ok(true)
}
