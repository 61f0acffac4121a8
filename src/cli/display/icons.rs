//! Status icons for CLI output

pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (file written, feature enabled)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon
    pub const WARNING: &'static str = "⚠";

    /// Unchanged / disabled
    pub const SKIPPED: &'static str = "–";

    pub fn get_flag_icon(enabled: bool) -> &'static str {
        if enabled {
            Self::SUCCESS
        } else {
            Self::SKIPPED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_flag_icon() {
        assert_eq!(StatusIcon::get_flag_icon(true), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_flag_icon(false), StatusIcon::SKIPPED);
    }
}
