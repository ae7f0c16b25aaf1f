//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support.

use std::io::{self, Write};

use mj_ir::{SourceLocation, SourceRegistry, StringLookup};

use super::DiagnosticEmitter;
use crate::{Diagnostic, Label, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// What the emitter needs to turn a label into file, line and column.
#[derive(Clone, Copy)]
pub struct SourceContext<'a> {
    pub registry: &'a SourceRegistry,
    pub interner: &'a dyn StringLookup,
}

impl SourceContext<'_> {
    fn locate(&self, label: &Label) -> Option<SourceLocation> {
        let file = self.registry.source_of(label.source).ok()?;
        SourceLocation::new(file, label.span).ok()
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<'a, W: Write> {
    writer: W,
    colors: bool,
    sources: Option<SourceContext<'a>>,
}

impl<'a, W: Write> TerminalEmitter<'a, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            sources: None,
        }
    }

    /// Resolve label positions through the given sources.
    pub fn with_sources(mut self, sources: SourceContext<'a>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
            Severity::Help => colors::HELP,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_code(&mut self, code: &str) {
        if self.colors {
            let _ = write!(self.writer, "{}[{code}]{}", colors::BOLD, colors::RESET);
        } else {
            let _ = write!(self.writer, "[{code}]");
        }
    }

    fn write_label(&mut self, label: &Label) {
        let marker = if label.is_primary { "-->" } else { "   " };
        let _ = write!(self.writer, "  {marker} ");

        let located = self
            .sources
            .and_then(|ctx| ctx.locate(label).map(|loc| (loc, ctx.interner)));
        match &located {
            Some((loc, interner)) => {
                let position = loc.line_col(*interner);
                let path = loc.file().path().display().to_string();
                let _ = write!(self.writer, "{path}:{position}: ");
            }
            None => {
                let _ = write!(self.writer, "{:?}{:?}: ", label.source, label.span);
            }
        }

        let color = if label.is_primary {
            colors::ERROR
        } else {
            colors::SECONDARY
        };
        self.write_colored(&label.message, color);
        let _ = writeln!(self.writer);

        if let Some((loc, interner)) = located {
            let line = loc.line_text(interner);
            if !line.trim().is_empty() {
                let _ = writeln!(self.writer, "   | {line}");
            }
        }
    }

    fn write_trailer(&mut self, kind: &str, color: &str, text: &str) {
        let _ = write!(self.writer, "  = ");
        self.write_colored(kind, color);
        let _ = writeln!(self.writer, ": {text}");
    }
}

impl TerminalEmitter<'_, io::Stderr> {
    /// Create a terminal emitter for stderr with explicit color mode.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_severity(diagnostic.severity);
        self.write_code(diagnostic.code.as_str());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.write_label(label);
        }
        for note in &diagnostic.notes {
            self.write_trailer("note", colors::BOLD, note);
        }
        for suggestion in &diagnostic.suggestions {
            self.write_trailer("help", colors::HELP, suggestion);
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
