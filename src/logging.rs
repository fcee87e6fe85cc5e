use crate::error::{Error, Result};
use chrono::Local;
use env_logger::Env;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// env_logger on stderr, optionally mirrored into an append-only file.
pub struct Logger {
    console: env_logger::Logger,
    file: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(console: env_logger::Logger, log_file: Option<&Path>) -> std::io::Result<Self> {
        let file = match log_file {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };
        Ok(Self { console, file })
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.console.matches(record) {
            return;
        }
        self.console.log(record);

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "{} [{}] {}", timestamp, record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Level comes from `RUST_LOG` (default `info`); `debug` forces debug.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let console = builder.build();
    let max_level = console.filter();

    let logger = Logger::new(console, log_file)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| Error::ConfigError(format!("Failed to install logger: {}", e)))?;
    log::set_max_level(max_level);
    Ok(())
}
