//! The widget controller: one document cell plus its collaborators.

use std::time::{Duration, Instant};

use codepad_config::{SessionBackend, WidgetConfig, WidgetRecord};
use codepad_core::caret::{
    locate_in_spans, offset_in, offset_in_spans, preserve_caret_across_rerender, rehome_caret,
};
use codepad_core::indent::detect_indent;
use codepad_core::{
    normalize_line_endings, DisplayFlags, Document, Edit, EditorError, Highlight,
    HighlightProjector, IndentStyle, Language, StyledSpan,
};

use crate::clipboard::ClipboardSink;
use crate::event::{ChangeNotice, WidgetEvent};
use crate::notifications::Notifications;
use crate::theme::resolve_dark_mode;
use crate::view::RenderedView;

/// Per-instance settings used when the session store has no record.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Key for the session record.
    pub widget_id: String,
    pub default_code: String,
    pub default_language: Language,
    pub flags: DisplayFlags,
    /// Tab-key indent, unless the content shows its own.
    pub indent: IndentStyle,
    pub notice_duration: Duration,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self::from_config(&WidgetConfig::default())
    }
}

impl WidgetOptions {
    /// Builds options from the loaded config with a fresh widget id.
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            widget_id: uuid::Uuid::new_v4().to_string(),
            default_code: config.default_snippet.clone(),
            default_language: Language::resolve(&config.default_language),
            flags: DisplayFlags {
                dark_mode: resolve_dark_mode(config.theme_mode()),
                word_wrap: config.word_wrap,
                show_line_numbers: config.show_line_numbers,
            },
            indent: if config.use_tabs {
                IndentStyle::Tabs
            } else {
                IndentStyle::Spaces(config.indent_width)
            },
            notice_duration: Duration::from_secs(config.notification_secs),
        }
    }

    pub fn with_widget_id(mut self, id: impl Into<String>) -> Self {
        self.widget_id = id.into();
        self
    }
}

type ChangeCallback = Box<dyn FnMut(&ChangeNotice)>;

/// An embeddable code widget.
///
/// Every input event runs one synchronous pass: mutate the document,
/// re-project the text into styled spans, re-derive the caret, persist, and
/// rebuild the [`RenderedView`]. Collaborator failures never reach the host;
/// they are logged and the in-memory state stays authoritative.
pub struct CodeWidget {
    id: String,
    document: Document,
    projector: HighlightProjector<Box<dyn Highlight>>,
    spans: Vec<StyledSpan>,
    session: Option<Box<dyn SessionBackend>>,
    session_connected: bool,
    clipboard: Option<Box<dyn ClipboardSink>>,
    notifications: Notifications,
    popover_open: bool,
    on_change: Option<ChangeCallback>,
    view: RenderedView,
}

impl std::fmt::Debug for CodeWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeWidget")
            .field("id", &self.id)
            .field("document", &self.document)
            .field("session", &self.session.is_some())
            .field("session_connected", &self.session_connected)
            .field("clipboard", &self.clipboard.is_some())
            .field("popover_open", &self.popover_open)
            .finish_non_exhaustive()
    }
}

impl CodeWidget {
    /// Mounts a widget, restoring its saved record when the store has one.
    ///
    /// A store that fails to connect or load is logged and the defaults
    /// from `options` are used instead.
    pub fn mount(
        options: WidgetOptions,
        highlighter: Box<dyn Highlight>,
        mut session: Option<Box<dyn SessionBackend>>,
        clipboard: Option<Box<dyn ClipboardSink>>,
    ) -> Self {
        let mut session_connected = false;
        let mut saved = None;
        if let Some(store) = session.as_mut() {
            match store.connect() {
                Ok(()) => {
                    session_connected = true;
                    match store.get_data() {
                        Ok(record) => saved = record,
                        Err(e) => tracing::warn!(
                            "{}; using defaults for widget {}",
                            EditorError::persistence(&e),
                            options.widget_id
                        ),
                    }
                }
                Err(e) => tracing::warn!(
                    "{}; widget {} runs without persistence until a save reconnects",
                    EditorError::persistence(&e),
                    options.widget_id
                ),
            }
        }

        let (code, language, flags) = match saved {
            Some(record) => (
                record.code,
                Language::resolve(&record.language),
                DisplayFlags {
                    dark_mode: record.dark_mode,
                    word_wrap: record.word_wrap,
                    show_line_numbers: record.show_line_numbers,
                },
            ),
            None => (options.default_code, options.default_language, options.flags),
        };
        let code = normalize_line_endings(&code);
        let indent = detect_indent(&code).unwrap_or(options.indent);
        let mut document = Document::from_seed(&code, language).with_indent(indent);
        document.display = flags;

        let projector = HighlightProjector::new(highlighter);
        let spans = projector.project(&code, language);
        let notifications = Notifications::new(options.notice_duration);
        let view = RenderedView::build(
            language,
            &spans,
            document.caret_position(),
            flags,
            Vec::new(),
            false,
        );
        tracing::debug!(
            "Mounted widget {} ({} chars, {language})",
            options.widget_id,
            document.len_chars()
        );

        Self {
            id: options.widget_id,
            document,
            projector,
            spans,
            session,
            session_connected,
            clipboard,
            notifications,
            popover_open: false,
            on_change: None,
            view,
        }
    }

    /// Registers the callback told about every text, language or display change.
    pub fn on_change(&mut self, callback: impl FnMut(&ChangeNotice) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Runs one pass for `event` and returns the refreshed view.
    pub fn handle(&mut self, event: WidgetEvent) -> &RenderedView {
        tracing::trace!(widget = %self.id, ?event, "handling event");
        let change = match event {
            WidgetEvent::Edit(edit) => self.edit(|doc| doc.apply_edit(&edit)),
            WidgetEvent::Type(text) | WidgetEvent::Paste(text) => {
                self.edit(|doc| doc.insert_at_caret(&text))
            }
            WidgetEvent::Tab => self.edit(Document::insert_indent),
            WidgetEvent::MoveCaret(offset) => {
                self.document.set_caret(offset);
                None
            }
            WidgetEvent::MoveCaretTo { line, column } => {
                let offset = offset_in(self.document.line_index(), line, column);
                self.document.set_caret(offset);
                None
            }
            WidgetEvent::SetLanguage(tag) => {
                self.popover_open = false;
                self.switch_language(&tag)
            }
            WidgetEvent::ToggleDarkMode => {
                self.document.display.toggle_dark_mode();
                Some(ChangeNotice::Display(self.document.display))
            }
            WidgetEvent::ToggleWordWrap => {
                self.document.display.toggle_word_wrap();
                Some(ChangeNotice::Display(self.document.display))
            }
            WidgetEvent::ToggleLineNumbers => {
                self.document.display.toggle_line_numbers();
                Some(ChangeNotice::Display(self.document.display))
            }
            WidgetEvent::Copy => {
                self.copy();
                None
            }
            WidgetEvent::TogglePopover => {
                self.popover_open = !self.popover_open;
                None
            }
            WidgetEvent::DismissPopover => {
                self.popover_open = false;
                None
            }
        };

        if let Some(change) = change {
            self.persist();
            if let Some(callback) = self.on_change.as_mut() {
                callback(&change);
            }
        }
        self.refresh_view();
        &self.view
    }

    /// Replaces the whole text, keeping the caret where it was (clamped).
    pub fn set_text(&mut self, text: impl Into<String>) -> &RenderedView {
        self.handle(WidgetEvent::Edit(Edit::ReplaceAll(text.into())))
    }

    fn edit(
        &mut self,
        apply: impl FnOnce(&mut Document) -> Result<bool, EditorError>,
    ) -> Option<ChangeNotice> {
        match apply(&mut self.document) {
            Ok(true) => {
                let text = self.document.text();
                self.spans = self.projector.project(&text, self.document.language());
                let caret = preserve_caret_across_rerender(&text, self.document.caret());
                self.document.set_caret(caret);
                Some(ChangeNotice::Text(text))
            }
            Ok(false) => None,
            Err(e) => {
                tracing::warn!("Ignoring edit on widget {}: {e}", self.id);
                None
            }
        }
    }

    fn switch_language(&mut self, tag: &str) -> Option<ChangeNotice> {
        let previous = self.document.language();
        let language = self.document.set_language_or_default(tag);
        if language == previous {
            return None;
        }

        let cursor = locate_in_spans(&self.spans, self.document.caret());
        let spans = self.projector.project(&self.document.text(), language);
        let rehomed = rehome_caret(&self.spans, cursor, &spans);
        self.document.set_caret(offset_in_spans(&spans, rehomed));
        self.spans = spans;
        Some(ChangeNotice::Language(language))
    }

    fn copy(&mut self) {
        let text = self.document.text();
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.write_text(&text),
            None => Err(anyhow::anyhow!("no clipboard attached")),
        };
        match result {
            Ok(()) => self.notifications.success("Copied!"),
            Err(e) => {
                let err = EditorError::clipboard(&e);
                tracing::warn!("Copy failed on widget {}: {err}", self.id);
                self.notifications.error("Copy failed");
            }
        }
    }

    /// Saves the current record. A store that never connected gets another
    /// connection attempt first.
    fn persist(&mut self) {
        let record = self.record();
        let Some(store) = self.session.as_mut() else {
            return;
        };
        if !self.session_connected {
            match store.connect() {
                Ok(()) => self.session_connected = true,
                Err(e) => {
                    tracing::warn!("{}; change kept in memory", EditorError::persistence(&e));
                    return;
                }
            }
        }
        if let Err(e) = store.set_data(&record) {
            tracing::warn!("{}; change kept in memory", EditorError::persistence(&e));
        }
    }

    /// Expires notices without an input event, for hosts running a timer.
    pub fn tick(&mut self) -> &RenderedView {
        self.tick_at(Instant::now())
    }

    /// Same as [`CodeWidget::tick`] at a given instant.
    pub fn tick_at(&mut self, now: Instant) -> &RenderedView {
        self.notifications.prune_at(now);
        self.rebuild_view();
        &self.view
    }

    fn refresh_view(&mut self) {
        self.notifications.prune();
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        self.view = RenderedView::build(
            self.document.language(),
            &self.spans,
            self.document.caret_position(),
            self.document.display,
            self.notifications.active().to_vec(),
            self.popover_open,
        );
    }

    /// Returns the record this widget persists.
    pub fn record(&self) -> WidgetRecord {
        let flags = self.document.display;
        WidgetRecord {
            code: self.document.text(),
            language: self.document.language().tag().to_string(),
            dark_mode: flags.dark_mode,
            word_wrap: flags.word_wrap,
            show_line_numbers: flags.show_line_numbers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    pub fn language(&self) -> Language {
        self.document.language()
    }

    pub fn flags(&self) -> DisplayFlags {
        self.document.display
    }

    pub fn caret(&self) -> usize {
        self.document.caret()
    }

    pub fn view(&self) -> &RenderedView {
        &self.view
    }

    /// Returns the styled spans of the current text.
    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_popover_open(&self) -> bool {
        self.popover_open
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Returns how many passes rendered unstyled because highlighting failed.
    pub fn highlight_fallbacks(&self) -> u64 {
        self.projector.fallback_count()
    }
}
