//! Process-wide log capture for unit tests.

use std::sync::Mutex;

use log::{
    Level, LevelFilter, Log, Metadata, Record,
    kv::{self, VisitSource},
};

#[derive(Debug, Clone)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
    pub key_values: Vec<(String, String)>,
}

impl CapturedRecord {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.key_values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct CapturingLogger {
    records: Mutex<Vec<CapturedRecord>>,
}

struct CollectKeyValues<'a>(&'a mut Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for CollectKeyValues<'_> {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push((key.as_str().to_string(), value.to_string()));
        Ok(())
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut key_values = Vec::new();
        let _ = record.key_values().visit(&mut CollectKeyValues(&mut key_values));
        if let Ok(mut records) = self.records.lock() {
            records.push(CapturedRecord {
                level: record.level(),
                message: record.args().to_string(),
                key_values,
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

/// Installs the capturing logger; safe to call from every test.
pub fn install() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

/// Everything logged so far by any test in this process.
pub fn records() -> Vec<CapturedRecord> {
    LOGGER
        .records
        .lock()
        .map(|records| records.clone())
        .unwrap_or_default()
}
