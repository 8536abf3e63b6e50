//! Logging capability passed explicitly into every stage call.
//!
//! Stages never talk to a global logger; they receive a `&dyn StageLog`.
//! Production code hands in [`TracingLog`], tests hand in [`MemoryLog`]
//! and assert on what was recorded.

use std::sync::Mutex;

/// What a pipeline stage is allowed to say about its progress.
pub trait StageLog: Send + Sync {
    fn info(&self, msg: &str);
    fn debug(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards stage messages to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl StageLog for TracingLog {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}

/// Captures stage messages in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Error,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        self.entries.lock().unwrap().push((level, msg.to_string()));
    }

    /// All recorded messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, m)| m.contains(needle))
    }

    /// Number of messages recorded at `level`.
    pub fn count_at(&self, level: Level) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl StageLog for MemoryLog {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_records_in_order() {
        let log = MemoryLog::new();
        log.info("first");
        log.debug("second");
        log.error("third");

        assert_eq!(log.messages(), vec!["first", "second", "third"]);
        assert_eq!(log.count_at(Level::Info), 1);
        assert_eq!(log.count_at(Level::Error), 1);
        assert!(log.contains("second"));
        assert!(!log.contains("fourth"));
    }

    #[test]
    fn stage_log_is_object_safe() {
        let log = MemoryLog::new();
        let dyn_log: &dyn StageLog = &log;
        dyn_log.info("via trait object");
        assert!(log.contains("via trait object"));
    }
}
