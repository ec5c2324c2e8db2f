//! Table formatting and output utilities

use crate::error::{MindmapError, Result};
use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style},
    Table,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Apply the standard rounded style to a table
pub fn format_table(mut table: Table, no_color: bool) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Padding::new(1, 1, 0, 0));

    if !no_color {
        table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
    }

    table.to_string()
}

/// Serialize a value for the structured output formats
pub fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Table => Err(MindmapError::invalid_argument(
            "table output is not a structured format",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabled::Tabled;

    #[derive(Tabled, Serialize)]
    struct Row {
        key: &'static str,
        value: u32,
    }

    #[test]
    fn test_format_table_without_color() {
        let table = Table::new([Row { key: "maxBranchesPerLevel", value: 10 }]);
        let out = format_table(table, true);
        assert!(out.contains("maxBranchesPerLevel"));
        assert!(out.contains("10"));
        assert!(!out.contains("\u{1b}["));
    }

    #[test]
    fn test_render_structured() {
        let row = Row { key: "depth", value: 3 };
        let json = render_structured(&row, OutputFormat::Json).unwrap();
        assert!(json.contains("\"value\": 3"));
        let yaml = render_structured(&row, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("key: depth"));
        assert!(render_structured(&row, OutputFormat::Table).is_err());
    }
}
