// Editor state tracking: undo timeline, change detection, field-level history.
// Sessions are explicit context objects owned by the registry in AppState.

pub mod detector;
pub mod handlers;
pub mod history;
pub mod session;
pub mod snapshot;
pub mod undo;

pub use session::{SessionRegistry, SessionView};
