//! Timestamped log output.
//!
//! Every line produced through the crate macros ([`info!`](crate::info),
//! [`warning!`](crate::warning), ...) goes through [`emit`]. The line is
//! printed to stdout in colour and, once [`init`] has been called, appended
//! in plain text to a per-day file inside the log folder:
//!
//! ```text
//! ~/.local/share/spotskip/logs/2025-10-24.txt
//! ```
//!
//! The file is picked per line from the local date, so a process that runs
//! across midnight continues in the next day's file.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::{DateTime, Local, NaiveDate};
use colored::Colorize;

static SINK: OnceLock<LogSink> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    /// A "now playing" line, set apart by a blank line.
    Track,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Info => "o",
            Level::Success => "✓",
            Level::Warning => "!",
            Level::Error => "x",
            Level::Track => "♪",
        }
    }

    fn colored_marker(self) -> colored::ColoredString {
        let marker = self.marker();
        match self {
            Level::Info => marker.blue().bold(),
            Level::Success => marker.green().bold(),
            Level::Warning => marker.yellow().bold(),
            Level::Error => marker.red().bold(),
            Level::Track => marker.magenta().bold(),
        }
    }
}

/// Formats a single plain-text log line without trailing newline.
pub fn format_line(level: Level, at: DateTime<Local>, message: &str) -> String {
    format!(
        "[{time}] [{marker}] {message}",
        time = at.format("%H:%M:%S"),
        marker = level.marker(),
    )
}

/// Append-only writer over a folder of daily log files.
pub struct LogSink {
    dir: PathBuf,
    current: Mutex<Option<(NaiveDate, File)>>,
}

impl LogSink {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            current: Mutex::new(None),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.txt", date.format("%Y-%m-%d")))
    }

    pub fn write_at(&self, level: Level, message: &str, at: DateTime<Local>) -> std::io::Result<()> {
        self.append(at.date_naive(), |file| {
            if level == Level::Track {
                writeln!(file)?;
            }
            writeln!(file, "{}", format_line(level, at, message))
        })
    }

    fn append<F>(&self, today: NaiveDate, write: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut File) -> std::io::Result<()>,
    {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let stale = !matches!(current.as_ref(), Some((date, _)) if *date == today);
        if stale {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.file_for(today))?;
            *current = Some((today, file));
        }

        match current.as_mut() {
            Some((_, file)) => {
                write(file)?;
                file.flush()
            }
            None => Ok(()),
        }
    }
}

/// Enables the file sink. Subsequent calls are ignored.
pub fn init(dir: impl Into<PathBuf>) -> std::io::Result<()> {
    let sink = LogSink::new(dir)?;
    let _ = SINK.set(sink);
    Ok(())
}

/// The active log folder, if the file sink is enabled.
pub fn log_dir() -> Option<&'static Path> {
    SINK.get().map(LogSink::dir)
}

pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    let now = Local::now();
    let message = args.to_string();

    if level == Level::Track {
        println!();
    }
    println!(
        "[{}] [{}] {}",
        now.format("%H:%M:%S").to_string().dimmed(),
        level.colored_marker(),
        message
    );

    if let Some(sink) = SINK.get() {
        if let Err(e) = sink.write_at(level, &message, now) {
            eprintln!("cannot write log file: {e}");
        }
    }
}

/// Writes the header that opens every run.
pub fn banner() {
    let rule = "=".repeat(60);
    let started = Local::now().format("%Y-%m-%d %H:%M:%S");
    let text = format!(
        "Starting {} (v{}): {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        started
    );

    println!("\n{rule}\n{}\n{rule}\n", text.bold());
    if let Some(sink) = SINK.get() {
        let written = sink.append(Local::now().date_naive(), |file| {
            writeln!(file, "\n{rule}\n{text}\n{rule}\n")
        });
        if let Err(e) = written {
            eprintln!("cannot write log file: {e}");
        }
    }
}
