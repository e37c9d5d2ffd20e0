use chrono::Local;
use colored::*;

/// Scoped console logger. Every actor owns one, tagged with its name.
#[derive(Debug, Clone)]
pub struct Logger {
    pub scope: String,
    pub scope_color: Color,
}

impl Logger {
    pub fn new(scope: impl Into<String>, scope_color: Color) -> Self {
        Self {
            scope: scope.into().to_uppercase(),
            scope_color,
        }
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S%.3f").to_string()
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        println!(
            "{} {} {}",
            format!("[{}][INFO][{}]", Self::timestamp(), self.scope)
                .bold()
                .color(self.scope_color),
            "→".dimmed(),
            msg.as_ref()
        );
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        println!(
            "{} {} {}",
            format!("[{}][WARN][{}]", Self::timestamp(), self.scope)
                .bold()
                .yellow(),
            "→".dimmed(),
            msg.as_ref()
        );
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!(
            "{} {} {}",
            format!("[{}][ERROR][{}]", Self::timestamp(), self.scope)
                .bold()
                .bright_red(),
            "→".dimmed(),
            msg.as_ref()
        );
    }
}
