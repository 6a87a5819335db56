use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use codepad_config::{SessionBackend, SessionStore, ThemeMode, WidgetConfig};
use codepad_core::Language;
use codepad_widget::{
    resolve_dark_mode, CodeWidget, RenderedView, SyntectHighlighter, SystemClipboard,
    WidgetEvent, WidgetOptions,
};

/// Renders source code through the codepad widget pipeline.
#[derive(Parser, Debug)]
#[command(name = "codepad", version, about)]
struct Cli {
    /// File to load. Reads stdin when omitted and stdin is piped.
    file: Option<PathBuf>,

    /// Language tag (javascript, python, sql, ...). Detected from the file
    /// extension when omitted.
    #[arg(long)]
    language: Option<String>,

    /// Theme: system, dark or light.
    #[arg(long)]
    theme: Option<String>,

    /// Enable word wrap.
    #[arg(long)]
    wrap: bool,

    /// Hide the line-number gutter.
    #[arg(long = "no-line-numbers")]
    no_line_numbers: bool,

    /// Caret char offset.
    #[arg(long)]
    caret: Option<usize>,

    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session database path. Defaults to one next to the config file.
    #[arg(long)]
    session: Option<PathBuf>,

    /// Widget id whose session record is loaded and saved.
    #[arg(long = "widget-id")]
    widget_id: Option<String>,

    /// Delete the widget's saved record before mounting.
    #[arg(long, requires = "widget_id")]
    reset: bool,

    /// Print an HTML page instead of plain text.
    #[arg(long)]
    html: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(WidgetConfig::config_path);
    let mut config = WidgetConfig::load_or_create(&config_path);
    if let Some(theme) = &cli.theme {
        if ThemeMode::parse(theme).is_none() {
            tracing::warn!("Unknown theme '{theme}', using System");
        }
        config.theme = theme.clone();
        config.sanitize();
    }

    let mut options = WidgetOptions::from_config(&config);

    let session = match &cli.widget_id {
        Some(id) => {
            options = options.with_widget_id(id.clone());
            let path = cli
                .session
                .clone()
                .unwrap_or_else(|| config.resolve_session_path(&config_path));
            let mut store = SessionStore::new(path, id.clone());
            tracing::debug!(
                "Session for widget {} at {}",
                store.widget_id(),
                store.path().display()
            );
            if cli.reset {
                store.connect()?;
                store.delete()?;
                tracing::info!("Cleared saved record for widget {id}");
            }
            Some(Box::new(store) as Box<dyn SessionBackend>)
        }
        None => None,
    };

    let input = read_input(&cli)?;
    let language = cli
        .language
        .as_deref()
        .map(Language::resolve)
        .or_else(|| cli.file.as_deref().and_then(Language::from_path));

    let highlighter = SyntectHighlighter::new();
    let stylesheets = if cli.html {
        Some((highlighter.stylesheet(true)?, highlighter.stylesheet(false)?))
    } else {
        None
    };

    let mut widget = CodeWidget::mount(
        options,
        Box::new(highlighter),
        session,
        Some(Box::new(SystemClipboard::new())),
    );
    tracing::info!("Mounted widget {}", widget.id());

    apply_display_overrides(&mut widget, &cli, &config);
    if let Some(text) = input {
        widget.set_text(text);
    }
    if let Some(language) = language {
        widget.handle(WidgetEvent::SetLanguage(language.tag().to_string()));
    }
    if let Some(offset) = cli.caret {
        widget.handle(WidgetEvent::MoveCaret(offset));
    }

    let view = widget.view();
    match stylesheets {
        Some((dark, light)) => {
            let css = if view.flags.dark_mode { dark } else { light };
            print!("{}", html_page(view, &css));
        }
        None => print!("{}", plain_page(view)),
    }
    Ok(())
}

/// Applies display flags given on the command line. They win over both the
/// config and a saved session record.
fn apply_display_overrides(widget: &mut CodeWidget, cli: &Cli, config: &WidgetConfig) {
    if cli.wrap && !widget.flags().word_wrap {
        widget.handle(WidgetEvent::ToggleWordWrap);
    }
    if cli.no_line_numbers && widget.flags().show_line_numbers {
        widget.handle(WidgetEvent::ToggleLineNumbers);
    }
    if cli.theme.is_some() && resolve_dark_mode(config.theme_mode()) != widget.flags().dark_mode {
        widget.handle(WidgetEvent::ToggleDarkMode);
    }
}

/// Reads the file argument, or stdin when it is piped. `None` keeps the
/// widget's saved or default content.
fn read_input(cli: &Cli) -> Result<Option<String>> {
    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Some(text));
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(Some(text))
}

fn html_page(view: &RenderedView, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{css}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        view.to_html()
    )
}

fn plain_page(view: &RenderedView) -> String {
    let width = view.lines.len().to_string().len();
    let mut out = String::new();
    for line in &view.lines {
        if view.flags.show_line_numbers {
            out.push_str(&format!("{:>width$} | ", line.number));
        }
        out.push_str(&line.text());
        out.push('\n');
    }
    out.push_str(&format!(
        "-- {} | {} --\n",
        view.language.display_name(),
        view.status
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_config::{MemorySessionStore, WidgetRecord};
    use codepad_core::PlainHighlighter;

    fn saved_widget() -> CodeWidget {
        let store = MemorySessionStore::with_record(WidgetRecord {
            code: "x = 1".to_string(),
            language: "python".to_string(),
            dark_mode: false,
            word_wrap: false,
            show_line_numbers: true,
        });
        CodeWidget::mount(
            WidgetOptions::default().with_widget_id("cli"),
            Box::new(PlainHighlighter),
            Some(Box::new(store)),
            None,
        )
    }

    #[test]
    fn test_cli_flags_override_saved_record() {
        let cli = Cli::parse_from(["codepad", "--wrap", "--no-line-numbers", "--theme", "dark"]);
        let mut config = WidgetConfig::default();
        config.theme = "dark".to_string();
        config.sanitize();

        let mut widget = saved_widget();
        apply_display_overrides(&mut widget, &cli, &config);
        let flags = widget.flags();
        assert!(flags.word_wrap);
        assert!(!flags.show_line_numbers);
        assert!(flags.dark_mode);
        assert_eq!(widget.text(), "x = 1");
    }

    #[test]
    fn test_no_cli_flags_keep_saved_record() {
        let cli = Cli::parse_from(["codepad"]);
        let mut widget = saved_widget();
        apply_display_overrides(&mut widget, &cli, &WidgetConfig::default());
        let flags = widget.flags();
        assert!(!flags.word_wrap);
        assert!(flags.show_line_numbers);
        assert!(!flags.dark_mode);
    }
}
