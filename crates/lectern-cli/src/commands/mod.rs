//! Command implementations.

pub mod analyze;
pub mod chat;
pub mod config;
pub mod save;
pub mod watch;

pub use self::analyze::execute_analyze;
pub use self::chat::execute_chat;
pub use self::config::execute_config;
pub use self::save::execute_save;
pub use self::watch::execute_watch;
