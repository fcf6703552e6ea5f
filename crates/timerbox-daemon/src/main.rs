//! Timerbox
//!
//! Command line front end: manages named countdown timers and drives them
//! in the foreground with `timerbox run`.

use anyhow::{bail, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;

use timerbox_core::models::{format_hms, Timer, TimerUpdate};
use timerbox_core::notify::{Notification, NotificationSink};
use timerbox_core::storage::{FileStore, KeyValueStore, MemoryStore, TimerStorage};
use timerbox_core::validation::{validate_timer_form, TimerFormData};
use timerbox_daemon::{
    ConfigManager, EventManager, EventObserver, MultiNotifier, PersistObserver, StderrNotifier,
    TickDriver, TimerEvent, TimerEventType, TimerStore,
};

#[derive(Parser, Debug)]
#[command(name = "timerbox")]
#[command(about = "Timerbox - named countdown timers", long_about = None)]
struct Args {
    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Directory timers and logs are stored in (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Keep timers in memory only; the stored collection is neither read nor written
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a timer
    Add(AddArgs),
    /// List all timers
    List {
        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one timer
    Show { id: String },
    /// Delete a timer
    Delete { id: String },
    /// Start or stop a timer
    Toggle { id: String },
    /// Reset a timer to its full duration
    Restart { id: String },
    /// Edit a timer; this stops it and re-arms the full duration
    Edit(EditArgs),
    /// Delete every timer
    Clear,
    /// Count down running timers in the foreground
    Run {
        /// Exit once no timer is running
        #[arg(long)]
        until_idle: bool,
    },
    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    #[arg(short, long)]
    title: String,

    #[arg(short, long, default_value = "")]
    description: String,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    hours: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    minutes: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    seconds: i64,
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
    id: String,

    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    description: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    hours: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    minutes: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    seconds: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Update configuration values
    Set {
        /// Tick cadence in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        #[arg(long)]
        desktop: Option<bool>,

        #[arg(long)]
        bell: Option<bool>,

        /// Storage key the timer collection is saved under
        #[arg(long)]
        storage_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = match &args.config_dir {
        Some(dir) => ConfigManager::with_dir(dir.clone())?,
        None => ConfigManager::new()?,
    };
    let config = config_manager.get().await;

    let data_dir = match &args.data_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => config_manager.data_dir().await?,
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(&data_dir, log_level)?;

    tracing::debug!("Data directory: {}", data_dir.display());

    if let Command::Config { action } = &args.command {
        return handle_config(&config_manager, action).await;
    }

    let backend: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(data_dir.clone()))
    };
    let storage = TimerStorage::new(backend, config.storage.key.clone());
    let mut store =
        TimerStore::load(&storage).with_observer(PersistObserver::new(storage.clone()));

    match args.command {
        Command::Add(add) => {
            let form = TimerFormData {
                title: add.title,
                description: add.description,
                hours: add.hours,
                minutes: add.minutes,
                seconds: add.seconds,
            };
            if !validate_timer_form(&form, &StderrNotifier) {
                bail!("Timer not created");
            }

            let timer = store.add(form.to_new_timer()?);
            StderrNotifier.notify(&Notification::success(format!(
                "Timer \"{}\" created",
                timer.title
            )));
            println!("{}", timer.id);
        }
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.timers())?);
            } else {
                print_table(store.timers());
            }
        }
        Command::Show { id } => match resolve_id(&store, &id)? {
            Some(id) => {
                if let Some(timer) = store.get(&id) {
                    print_timer(timer);
                }
            }
            None => eprintln!("No timer matches '{}'", id),
        },
        Command::Delete { id } => {
            let target = resolve_or_passthrough(&store, &id)?;
            if store.delete(&target) {
                StderrNotifier.notify(&Notification::success("Timer deleted"));
            } else {
                eprintln!("No timer matches '{}'", id);
            }
        }
        Command::Toggle { id } => {
            let target = resolve_or_passthrough(&store, &id)?;
            if store.toggle(&target) {
                if let Some(timer) = store.get(&target) {
                    print_timer(timer);
                    if timer.is_running && timer.is_completed() {
                        eprintln!("Timer has already finished; restart it to count down again");
                    }
                }
            } else {
                eprintln!("No timer matches '{}'", id);
            }
        }
        Command::Restart { id } => {
            let target = resolve_or_passthrough(&store, &id)?;
            if store.restart(&target) {
                if let Some(timer) = store.get(&target) {
                    print_timer(timer);
                }
            } else {
                eprintln!("No timer matches '{}'", id);
            }
        }
        Command::Edit(edit) => handle_edit(&mut store, edit)?,
        Command::Clear => {
            let count = store.len();
            store.clear();
            println!("Deleted {} timers", count);
        }
        Command::Run { until_idle } => {
            let events = Arc::new(EventManager::new());
            store.add_observer(Box::new(EventObserver::new(events.clone())));

            let store = Arc::new(Mutex::new(store));
            let notifier = Arc::new(MultiNotifier::from_config(&config.notifications));

            let driver = TickDriver::new(store.clone(), notifier)
                .with_storage(storage)
                .with_interval(config.tick.interval())
                .stop_when_idle(until_idle);

            run_foreground(driver, store, events, until_idle, tokio::signal::ctrl_c()).await?;
        }
        Command::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn init_logging(data_dir: &Path, log_level: &str) -> Result<()> {
    let log_file_path = data_dir.join("timerbox.log");

    // Create log file with append mode
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    // Warnings go to stderr, everything else only to the log file
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let stderr_writer = std::io::stderr.with_max_level(tracing::Level::WARN);
    let file_writer = std::sync::Mutex::new(log_file).with_max_level(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(stderr_writer.and(file_writer))
        .with_env_filter(log_level)
        .with_ansi(false)
        .init();

    Ok(())
}

async fn handle_config(manager: &ConfigManager, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = manager.get().await;
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!("# {}", manager.config_path().display());
        }
        ConfigAction::Set {
            tick_ms,
            desktop,
            bell,
            storage_key,
        } => {
            if let Some(interval_ms) = tick_ms {
                manager.set_tick_interval(*interval_ms).await?;
            }
            if desktop.is_some() || bell.is_some() {
                manager.update_notifications(*desktop, *bell).await?;
            }
            if let Some(key) = storage_key {
                manager.update_storage(Some(key.clone()), None).await?;
            }

            let config = manager.get().await;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn handle_edit(store: &mut TimerStore, edit: EditArgs) -> Result<()> {
    let Some(id) = resolve_id(store, &edit.id)? else {
        eprintln!("No timer matches '{}'", edit.id);
        return Ok(());
    };
    let Some(existing) = store.get(&id) else {
        return Ok(());
    };

    let time_changed = edit.hours.is_some() || edit.minutes.is_some() || edit.seconds.is_some();
    if edit.title.is_none() && edit.description.is_none() && !time_changed {
        bail!("Nothing to edit; pass --title, --description or a time component");
    }

    // Unspecified fields keep the timer's current values
    let current = TimerFormData::from_timer(existing);
    let form = TimerFormData {
        title: edit.title.clone().unwrap_or(current.title),
        description: edit.description.clone().unwrap_or(current.description),
        hours: edit.hours.unwrap_or(current.hours),
        minutes: edit.minutes.unwrap_or(current.minutes),
        seconds: edit.seconds.unwrap_or(current.seconds),
    };
    if !validate_timer_form(&form, &StderrNotifier) {
        bail!("Timer not updated");
    }

    let full = form.to_update()?;
    let update = TimerUpdate {
        title: edit.title.and(full.title),
        description: edit.description.and(full.description),
        duration: if time_changed { full.duration } else { None },
    };

    store.edit(&id, update);
    if let Some(timer) = store.get(&id) {
        print_timer(timer);
    }

    Ok(())
}

/// Drive `driver` until it goes idle or `shutdown` resolves, printing timer events
async fn run_foreground<F: Future>(
    driver: TickDriver,
    store: Arc<Mutex<TimerStore>>,
    events: Arc<EventManager>,
    until_idle: bool,
    shutdown: F,
) -> Result<()> {
    {
        let store = store.lock().await;
        let running: Vec<&Timer> = store
            .timers()
            .iter()
            .filter(|t| t.is_counting_down())
            .collect();
        if running.is_empty() {
            println!("No running timers");
            if until_idle {
                return Ok(());
            }
        }
        for timer in running {
            println!(
                "{}  {}  {}",
                short_id(&timer.id),
                format_hms(timer.remaining_time),
                timer.title
            );
        }
    }

    let mut rx = events.subscribe();
    let handle = driver.spawn();
    let cancel = handle.cancellation_token();
    let mut finished = std::pin::pin!(handle.join());
    let mut shutdown = std::pin::pin!(shutdown);
    let mut interrupted = false;

    loop {
        tokio::select! {
            result = &mut finished => {
                result?;
                break;
            }
            event = rx.recv() => match event {
                Ok(event) => render_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} timer events", skipped);
                }
                Err(RecvError::Closed) => {}
            },
            _ = &mut shutdown, if !interrupted => {
                tracing::info!("Interrupted, stopping tick loop");
                interrupted = true;
                cancel.cancel();
            }
        }
    }

    // Events published by the final pulse
    while let Ok(event) = rx.try_recv() {
        render_event(&event);
    }

    Ok(())
}

fn render_event(event: &TimerEvent) {
    let id = event.timer_id.as_deref().map(short_id).unwrap_or("-");
    match &event.event_type {
        TimerEventType::Tick { remaining_time } => {
            println!("{}  {}", id, format_hms(*remaining_time));
        }
        TimerEventType::Completed { title } => {
            println!("{}  \"{}\" finished", id, title);
        }
        _ => {}
    }
}

/// Exact id first, then a unique prefix. Ambiguous prefixes are an error.
fn resolve_id(store: &TimerStore, query: &str) -> Result<Option<String>> {
    if store.get(query).is_some() {
        return Ok(Some(query.to_string()));
    }

    let matches = store.matching_prefix(query);
    match matches.as_slice() {
        [] => Ok(None),
        [timer] => Ok(Some(timer.id.clone())),
        _ => bail!("'{}' matches {} timers; use a longer id", query, matches.len()),
    }
}

/// Unresolved ids are passed through so the store treats them as a no-op
fn resolve_or_passthrough(store: &TimerStore, query: &str) -> Result<String> {
    Ok(resolve_id(store, query)?.unwrap_or_else(|| query.to_string()))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_table(timers: &[Timer]) {
    if timers.is_empty() {
        println!("No timers");
        return;
    }

    println!(
        "{:<8}  {:<9}  {:>9}  {:>9}  TITLE",
        "ID", "STATUS", "REMAINING", "DURATION"
    );
    for timer in timers {
        println!(
            "{:<8}  {:<9}  {:>9}  {:>9}  {}",
            short_id(&timer.id),
            timer.status().as_str(),
            format_hms(timer.remaining_time),
            format_hms(timer.duration),
            timer.title
        );
    }
}

fn print_timer(timer: &Timer) {
    println!("id:          {}", timer.id);
    println!("title:       {}", timer.title);
    if !timer.description.is_empty() {
        println!("description: {}", timer.description);
    }
    println!("status:      {}", timer.status().as_str());
    println!(
        "remaining:   {} of {} ({:.0}% elapsed)",
        format_hms(timer.remaining_time),
        format_hms(timer.duration),
        timer.progress() * 100.0
    );
    println!(
        "created:     {}",
        timer.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
