pub mod config;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod reqwest_transport;
pub mod sqlite_store;
pub mod system_clock;
pub mod time;
