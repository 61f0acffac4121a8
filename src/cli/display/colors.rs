//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color of a yes/no feature cell
    pub fn get_flag_color(&self, enabled: bool) -> TableColor {
        if enabled {
            self.success
        } else {
            self.muted
        }
    }

    /// Color of a build matrix cell: empty matrices cannot be built
    pub fn get_matrix_color(&self, combinations: usize) -> TableColor {
        if combinations == 0 {
            self.warning
        } else {
            self.info
        }
    }
}
