//! Event tables for simulation analysis.
//!
//! A `tracing` subscriber that turns every event into one row of a table
//! named after the event's target. Columns are created the first time a
//! field name shows up; rows that lack a field get that column's zero value.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "allocation", agent_id, resource_id, quantity);
//!
//! // In test:
//! let recorder = instrument::record(|| { /* run setup */ });
//! let allocations = recorder.table("allocation").unwrap().to_dataframe()?;
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

// === VALUES & COLUMNS ===

/// A single recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

/// A typed column. The type is fixed by the first value recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    UInt(Vec<u64>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Flag(Vec<bool>),
    Text(Vec<String>),
}

impl Column {
    fn empty_like(value: &Value, rows: usize) -> Self {
        match value {
            Value::UInt(_) => Column::UInt(vec![0; rows]),
            Value::Int(_) => Column::Int(vec![0; rows]),
            Value::Float(_) => Column::Float(vec![0.0; rows]),
            Value::Flag(_) => Column::Flag(vec![false; rows]),
            Value::Text(_) => Column::Text(vec![String::new(); rows]),
        }
    }

    /// Append `value`, or the zero value if it is missing or of another type.
    fn push(&mut self, value: Option<Value>) {
        match (self, value) {
            (Column::UInt(v), Some(Value::UInt(x))) => v.push(x),
            (Column::Int(v), Some(Value::Int(x))) => v.push(x),
            (Column::Float(v), Some(Value::Float(x))) => v.push(x),
            (Column::Flag(v), Some(Value::Flag(x))) => v.push(x),
            (Column::Text(v), Some(Value::Text(x))) => v.push(x),
            (Column::UInt(v), _) => v.push(0),
            (Column::Int(v), _) => v.push(0),
            (Column::Float(v), _) => v.push(0.0),
            (Column::Flag(v), _) => v.push(false),
            (Column::Text(v), _) => v.push(String::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::UInt(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Flag(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// === TABLES ===

/// All events recorded under one target. Every column has `rows` entries.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: BTreeMap<String, Column>,
    pub rows: usize,
}

impl EventTable {
    /// Append one row given as `(field, value)` pairs.
    pub fn append(&mut self, fields: Vec<(&'static str, Value)>) {
        let mut fields: BTreeMap<&'static str, Value> = fields.into_iter().collect();

        for (name, value) in &fields {
            if !self.columns.contains_key(*name) {
                self.columns
                    .insert(name.to_string(), Column::empty_like(value, self.rows));
            }
        }
        for (name, column) in self.columns.iter_mut() {
            column.push(fields.remove(name.as_str()));
        }
        self.rows += 1;
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: BTreeMap<String, EventTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    pub fn rows(&self, target: &str) -> usize {
        self.table(target).map_or(0, |t| t.rows)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

// === SUBSCRIBER ===

struct RowVisitor {
    fields: Vec<(&'static str, Value)>,
}

impl Visit for RowVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push((field.name(), Value::UInt(value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name(), Value::Int(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push((field.name(), Value::Float(value)));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.push((field.name(), Value::Flag(value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name(), Value::Text(value.to_string())));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields.push((field.name(), Value::Text(format!("{:?}", value))));
    }
}

/// Subscriber that appends INFO-and-above events to the thread-local recorder.
///
/// With `only`, events from other targets are ignored.
#[derive(Debug, Clone, Default)]
pub struct EventTableSubscriber {
    targets: Option<Vec<&'static str>>,
}

impl EventTableSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only(targets: &[&'static str]) -> Self {
        Self {
            targets: Some(targets.to_vec()),
        }
    }
}

impl Subscriber for EventTableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event()
            && *metadata.level() <= Level::INFO
            && self
                .targets
                .as_ref()
                .is_none_or(|t| t.iter().any(|name| *name == metadata.target()))
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        // Spans are not recorded
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = RowVisitor { fields: Vec::new() };
        event.record(&mut visitor);

        let target = event.metadata().target().to_string();
        RECORDER.with(|r| {
            r.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .append(visitor.fields);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install [`EventTableSubscriber`] as the global default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(EventTableSubscriber::new());
}

/// Take everything recorded on this thread.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with a scoped subscriber on this thread and return what it recorded.
pub fn record<F: FnOnce()>(f: F) -> Recorder {
    clear();
    tracing::subscriber::with_default(EventTableSubscriber::new(), f);
    drain()
}

// === POLARS ===

use polars::prelude::*;

impl EventTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<polars::prelude::Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                Column::UInt(v) => polars::prelude::Column::new(name.as_str().into(), v),
                Column::Int(v) => polars::prelude::Column::new(name.as_str().into(), v),
                Column::Float(v) => polars::prelude::Column::new(name.as_str().into(), v),
                Column::Flag(v) => polars::prelude::Column::new(name.as_str().into(), v),
                Column::Text(v) => polars::prelude::Column::new(name.as_str().into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Convert every table; tables that fail to convert are left out.
    pub fn to_dataframes(&self) -> BTreeMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

fn io_error(err: std::io::Error) -> PolarsError {
    PolarsError::IO {
        error: err.into(),
        msg: None,
    }
}

/// Write each DataFrame to `{dir}/{name}.parquet`.
pub fn save_parquet(dfs: &mut BTreeMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(io_error)?;
    for (name, df) in dfs.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(io_error)?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

/// Guard that records one run and writes its tables as parquet on drop.
///
/// Files land in `{parent}/{name}_{unix_seconds}/` followed by a `_ready`
/// sentinel once every table is written.
///
/// ```ignore
/// let mut run = instrument::RunRecorder::new("data", "seed_42");
/// world.distribute()?;
/// let dfs = run.frames();
/// ```
pub struct RunRecorder {
    run_dir: PathBuf,
    frames: Option<BTreeMap<String, DataFrame>>,
}

impl RunRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str) -> Self {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let safe: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(60)
            .collect();
        clear();
        install_subscriber();
        Self {
            run_dir: parent.into().join(format!("{safe}_{stamp}")),
            frames: None,
        }
    }

    /// Drain this thread's recorder once and return the cached frames.
    pub fn frames(&mut self) -> &BTreeMap<String, DataFrame> {
        self.frames.get_or_insert_with(|| drain().to_dataframes())
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        let mut frames = self.frames.take().unwrap_or_else(|| drain().to_dataframes());
        if frames.is_empty() {
            return;
        }
        if let Err(e) = save_parquet(&mut frames, &self.run_dir) {
            eprintln!("RunRecorder({}): failed to write parquet: {}", self.run_dir.display(), e);
            return;
        }
        if let Err(e) = std::fs::File::create(self.run_dir.join("_ready")) {
            eprintln!("RunRecorder({}): failed to write _ready: {}", self.run_dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_aligns_columns() {
        let mut table = EventTable::default();
        table.append(vec![("agent_id", Value::UInt(1)), ("quantity", Value::UInt(4))]);
        table.append(vec![("agent_id", Value::UInt(2)), ("idle", Value::UInt(3))]);

        assert_eq!(table.rows, 2);
        for column in table.columns.values() {
            assert_eq!(column.len(), 2);
        }
        assert_eq!(table.column("quantity"), Some(&Column::UInt(vec![4, 0])));
        assert_eq!(table.column("idle"), Some(&Column::UInt(vec![0, 3])));
    }

    #[test]
    fn test_type_mismatch_gets_zero() {
        let mut table = EventTable::default();
        table.append(vec![("share", Value::Float(0.5))]);
        table.append(vec![("share", Value::Text("n/a".into()))]);
        assert_eq!(table.column("share"), Some(&Column::Float(vec![0.5, 0.0])));
    }

    #[test]
    fn test_records_tracing_events() {
        let recorder = record(|| {
            tracing::info!(target: "allocation", agent_id = 0u64, resource_id = 3u64, quantity = 7u64);
            tracing::info!(target: "allocation", agent_id = 1u64, resource_id = 3u64, quantity = 2u64);
            tracing::info!(target: "resource_metrics", resource_id = 3u64, concentration = 0.75f64);
            tracing::debug!(target: "allocation", agent_id = 9u64);
        });

        assert_eq!(recorder.rows("allocation"), 2, "debug events are not recorded");
        assert_eq!(recorder.rows("resource_metrics"), 1);
        assert_eq!(
            recorder.table("allocation").unwrap().column("quantity"),
            Some(&Column::UInt(vec![7, 2]))
        );
    }

    #[test]
    fn test_target_filter() {
        clear();
        tracing::subscriber::with_default(EventTableSubscriber::only(&["allocation"]), || {
            tracing::info!(target: "allocation", quantity = 1u64);
            tracing::info!(target: "allocation_skip", resource_id = 1u64);
        });
        let recorder = drain();
        assert_eq!(recorder.rows("allocation"), 1);
        assert_eq!(recorder.rows("allocation_skip"), 0);
    }

    #[test]
    fn test_dataframe_conversion() {
        let mut table = EventTable::default();
        table.append(vec![("resource_id", Value::UInt(1)), ("distribution", Value::Float(0.25))]);
        table.append(vec![("resource_id", Value::UInt(2)), ("distribution", Value::Float(1.0))]);

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }
}
