pub mod aggregate;
pub mod bank;
pub mod browse;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod export;
pub mod import;
pub mod session;
pub mod source;
pub mod state;
pub mod tracing;
pub mod writer;

pub use config::CoreConfig;
pub use error::CoreError;
pub use session::{Direction, OrderingMode, Session, StudyMode};
pub use state::AppState;
