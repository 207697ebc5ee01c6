use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use rpmrm_uninstall::{AppliedAction, FileOp};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub(crate) fn style(self) -> OutputStyle {
        self.style
    }

    pub(crate) fn print_section(self, title: &str) {
        if let Some(line) = render_section_header(self.style, title) {
            println!("{line}");
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    )
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool, no_color: bool) -> OutputStyle {
    if stdout_is_tty && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("[{}] {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> String {
    match status {
        "ok" => "OK".to_string(),
        "warn" => "WARN".to_string(),
        "err" => "ERR".to_string(),
        "step" => "..".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

pub(crate) fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(colorize(section_style(), &format!("== {title} =="))),
    }
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn describe_applied(applied: &AppliedAction, test_only: bool) -> String {
    let verb = |done: &'static str, planned: &'static str| if test_only { planned } else { done };
    let path = applied.path.display();
    match &applied.op {
        FileOp::Kept => format!("{} {path}", verb("kept", "would keep")),
        FileOp::SkippedReplaced => format!("skipped {path} (replaced by another package)"),
        FileOp::Renamed { to } => {
            format!("{} {path} as {}", verb("saved", "would save"), to.display())
        }
        FileOp::Unlinked => format!("{} {path}", verb("removed", "would remove")),
        FileOp::RemovedDir => format!("{} directory {path}", verb("removed", "would remove")),
        FileOp::AlreadyGone => format!("{path} was already gone"),
        FileOp::Failed => format!("could not {} {path}", applied.action),
    }
}
