//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use std::path::PathBuf;

/// Extension information for target listings
#[derive(Debug, Clone)]
pub struct TargetInfo {
    pub directory: String,
    pub name: String,
    pub image_name: String,
    pub distributions: Vec<String>,
    pub major_versions: Vec<String>,
    pub auto_update_os_libs: bool,
    pub has_readme: bool,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render extension targets as a formatted table
    pub fn render_targets(&self, title: &str, targets: &[TargetInfo]) -> String {
        if targets.is_empty() {
            return "No extensions found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("TARGET").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("IMAGE").set_alignment(CellAlignment::Left),
                Cell::new("MATRIX").set_alignment(CellAlignment::Left),
                Cell::new("OS LIBS").set_alignment(CellAlignment::Center),
                Cell::new("README").set_alignment(CellAlignment::Center),
            ]);

        for target in targets {
            let combinations = target.distributions.len() * target.major_versions.len();
            let matrix = if combinations == 0 {
                format!("{} empty", StatusIcon::WARNING)
            } else {
                format!(
                    "{} x {}",
                    target.distributions.join(","),
                    target.major_versions.join(",")
                )
            };

            table.add_row(vec![
                Cell::new(&target.directory),
                Cell::new(&target.name),
                Cell::new(&target.image_name),
                Cell::new(matrix).fg(self.theme.get_matrix_color(combinations)),
                Cell::new(StatusIcon::get_flag_icon(target.auto_update_os_libs))
                    .fg(self.theme.get_flag_color(target.auto_update_os_libs))
                    .set_alignment(CellAlignment::Center),
                Cell::new(StatusIcon::get_flag_icon(target.has_readme))
                    .fg(self.theme.get_flag_color(target.has_readme))
                    .set_alignment(CellAlignment::Center),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} {} ─╮\n",
            title,
            format!("[{} extensions]", targets.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Enabled  {} Disabled  {} Empty build matrix\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::SKIPPED.bright_black(),
            StatusIcon::WARNING.yellow()
        ));

        output
    }

    /// One line per produced file
    pub fn render_written_files(&self, verb: &str, files: &[PathBuf]) -> String {
        if files.is_empty() {
            return format!("{} No files changed", StatusIcon::SKIPPED.bright_black());
        }

        files
            .iter()
            .map(|path| format!("{} {} {}", StatusIcon::SUCCESS.green(), verb, path.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
