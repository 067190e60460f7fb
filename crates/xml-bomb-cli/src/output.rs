//! Output formatting

use clap::ValueEnum;
use xml_bomb_matrix::MatrixReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn render(&self, report: &MatrixReport) -> String {
        match self {
            OutputFormat::Text => report.to_text(),
            OutputFormat::Markdown => report.to_markdown(),
            OutputFormat::Json => report.to_json(),
        }
    }
}
