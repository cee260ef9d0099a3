use console::{style, StyledObject};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Severity of a one-line message
#[derive(Debug, Clone, Copy)]
enum Level {
    Success,
    Info,
    Warning,
}

impl Level {
    fn status(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
        }
    }

    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Level::Success => style("✓").green().bold(),
            Level::Info => style("ℹ").blue().bold(),
            Level::Warning => style("⚠").yellow().bold(),
        }
    }
}

fn status_message(level: Level, message: impl Display) -> String {
    let output = serde_json::json!({
        "status": level.status(),
        "message": message.to_string(),
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        let format = if json { OutputFormat::Json } else { OutputFormat::Human };
        Self { format }
    }

    fn notice(&self, level: Level, message: impl Display) {
        let line = match self.format {
            OutputFormat::Human => format!("{} {}", level.marker(), message),
            OutputFormat::Json => status_message(level, message),
        };
        // stdout carries at most one JSON document
        match level {
            Level::Warning => eprintln!("{}", line),
            Level::Success | Level::Info => println!("{}", line),
        }
    }

    pub fn success(&self, message: impl Display) {
        self.notice(Level::Success, message);
    }

    pub fn info(&self, message: impl Display) {
        self.notice(Level::Info, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.notice(Level::Warning, message);
    }

    /// Render rows as a table. Prints nothing in JSON mode, where commands
    /// emit their structured result through [`OutputWriter::result`].
    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if let OutputFormat::Human = self.format {
            if rows.is_empty() {
                println!("{}", style("(no data)").dim());
            } else {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
    }

    /// Print a command's structured result wrapped in a success envelope
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let output = serde_json::json!({
            "status": "success",
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn section(&self, title: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_is_json() {
        let parsed: serde_json::Value =
            serde_json::from_str(&status_message(Level::Warning, "careful")).unwrap();
        assert_eq!(parsed["status"], "warning");
        assert_eq!(parsed["message"], "careful");
    }

    #[test]
    fn test_format_selection() {
        assert!(OutputWriter::new(true).is_json());
        assert!(!OutputWriter::new(false).is_json());
    }
}
