pub mod config;
pub mod session;

pub use config::{ThemeMode, WidgetConfig};
pub use session::{MemorySessionStore, SessionBackend, SessionStore, WidgetRecord};
