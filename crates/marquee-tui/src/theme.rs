use ratatui::style::Color;

/// Colors used by the preview
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    pub fg0: Color,
    pub grey2: Color,

    /// Original item
    pub original: Color,
    /// Cloned items
    pub cloned: Color,
    pub playing: Color,
    pub paused: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            original: Color::Rgb(0xd8, 0xa6, 0x57),
            cloned: Color::Rgb(0x7d, 0xae, 0xa3),
            playing: Color::Rgb(0xa9, 0xb6, 0x65),
            paused: Color::Rgb(0x92, 0x83, 0x74),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}
