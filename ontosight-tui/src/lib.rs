pub mod extract_monitor;

pub use extract_monitor::{
    create_monitor_channel, run_monitor, ExtractMessage, ExtractMonitor, LogLevel,
};
