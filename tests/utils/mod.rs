use log::{set_max_level, Level, Log, Metadata, Record};
use rand::distributions::{Alphanumeric, DistString};
use std::cell::RefCell;
use std::path::PathBuf;

pub fn rand_str(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vexil-test-{}", rand_str(12)));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub struct RecordingLogger {}

impl RecordingLogger {
    thread_local!(pub static LOGS: RefCell<String> = RefCell::new(String::default()));
}

impl Log for RecordingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().contains("vexil")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        Self::LOGS
            .with_borrow_mut(|l| l.push_str(format!("{level} {}\n", record.args()).as_str()));
    }

    fn flush(&self) {}
}

pub fn log_record_init() {
    set_max_level(log::LevelFilter::Info);
    _ = log::set_logger(&RecordingLogger {});
}
