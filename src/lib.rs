// What the integration tests drive headlessly. The TUI layer stays in
// main.rs, bin-only.
pub mod app_dirs;
pub mod config;
pub mod content;
pub mod engine;
pub mod records;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod stats;
pub mod util;
