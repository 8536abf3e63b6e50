pub mod config;
pub mod log;
pub mod table;

pub use config::Config;
pub use log::{MemoryLog, StageLog, TracingLog};
pub use table::{ColumnSpec, ColumnType, TableSpec, WriteMode};
