//! Host-side controller for the codepad widget.
//!
//! [`CodeWidget`] owns the document cell and runs one synchronous
//! edit → highlight → caret pass per input event. Highlighting, clipboard and
//! session storage are collaborators behind traits so hosts can swap them.
mod clipboard;
mod event;
mod notifications;
mod syntax;
mod theme;
mod view;
mod widget;

pub use clipboard::{ClipboardSink, SystemClipboard};
pub use event::{ChangeNotice, WidgetEvent};
pub use notifications::{Notice, NoticeKind, Notifications};
pub use syntax::SyntectHighlighter;
pub use theme::resolve_dark_mode;
pub use view::{RenderedLine, RenderedView};
pub use widget::{CodeWidget, WidgetOptions};
