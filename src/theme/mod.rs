//! Theme system for human-mode output.

use console::Style;

/// Colors and styles for inventory output.
#[derive(Debug, Clone)]
pub struct InvTheme {
    // Message colors; error and warning go to stderr
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,

    // Component styles
    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub position: Style,
    pub short_id: Style,
    pub price: Style,
    pub total: Style,
}

impl Default for InvTheme {
    fn default() -> Self {
        Self {
            accent: Style::new().color256(33),
            success: Style::new().color256(41).bold(),
            error: Style::new().color256(203).bold().for_stderr(),
            warning: Style::new().color256(214).for_stderr(),
            muted: Style::new().color256(245),
            header: Style::new().bold().color256(33),
            label: Style::new().dim(),
            value: Style::new().bold(),
            position: Style::new().bold().color256(214),
            short_id: Style::new().italic().color256(245),
            price: Style::new().color256(41),
            total: Style::new().bold().color256(41),
        }
    }
}

impl InvTheme {
    /// A theme that never emits escape codes.
    #[must_use]
    pub fn plain() -> Self {
        let plain = Style::new().force_styling(false);
        Self {
            accent: plain.clone(),
            success: plain.clone(),
            error: plain.clone(),
            warning: plain.clone(),
            muted: plain.clone(),
            header: plain.clone(),
            label: plain.clone(),
            value: plain.clone(),
            position: plain.clone(),
            short_id: plain.clone(),
            price: plain.clone(),
            total: plain,
        }
    }
}
