pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        pub const SURFACE2: Color = Color::Rgb(108, 112, 134); // Subtle dim

        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
        pub const MAUVE: Color = Color::Rgb(203, 166, 247);
    }
}

use std::io::{self, IsTerminal};

use nu_ansi_term::Style;

use catppuccin::Mocha;

/// Styles for stderr diagnostics; plain when stderr is not a TTY.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub error: Style,
    pub notice: Style,
    pub caret: Style,
    pub header: Style,
    pub dim: Style,
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            error: Style::new(),
            notice: Style::new(),
            caret: Style::new(),
            header: Style::new(),
            dim: Style::new(),
        }
    }

    pub fn mocha() -> Self {
        Self {
            error: Style::new().fg(Mocha::RED).bold(),
            notice: Style::new().fg(Mocha::YELLOW),
            caret: Style::new().fg(Mocha::MAUVE).bold(),
            header: Style::new().fg(Mocha::BLUE).bold(),
            dim: Style::new().fg(Mocha::SURFACE2),
        }
    }

    pub fn for_stderr() -> Self {
        if io::stderr().is_terminal() {
            Self::mocha()
        } else {
            Self::plain()
        }
    }
}
