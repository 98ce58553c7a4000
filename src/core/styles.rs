//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Coloring is applied only
//! when the caller says so, so there is no global color state to manage.
//!
//! ```
//! use reposift::core::styles::StyleRole;
//! assert_eq!(StyleRole::Category.paint("Builder", false), "Builder");
//! assert!(StyleRole::Category.paint("Builder", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header      => Some(Color::Yellow),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Error       => Some(Color::BrightRed),
    Category    => Some(Color::BrightGreen),
    Count       => None,
    Total       => Some(Color::Blue),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        ansi_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// prettytable style spec (`"Fy"`, `"FG"`, ...) for this role
    pub fn to_prettytable_spec(self) -> Option<String> {
        let spec = match self.color()? {
            Color::Black => "k",
            Color::Red => "r",
            Color::Green => "g",
            Color::Yellow => "y",
            Color::Blue => "b",
            Color::Magenta => "m",
            Color::Cyan => "c",
            Color::White => "w",
            Color::BrightBlack => "K",
            Color::BrightRed => "R",
            Color::BrightGreen => "G",
            Color::BrightYellow => "Y",
            Color::BrightBlue => "B",
            Color::BrightMagenta => "M",
            Color::BrightCyan => "C",
            Color::BrightWhite => "W",
            _ => return None,
        };
        Some(format!("F{}", spec))
    }
}

fn ansi_code(c: Color) -> Option<&'static str> {
    use Color::*;
    Some(match c {
        Black => "30",
        Red => "31",
        Green => "32",
        Yellow => "33",
        Blue => "34",
        Magenta => "35",
        Cyan => "36",
        White => "37",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        BrightYellow => "93",
        BrightBlue => "94",
        BrightMagenta => "95",
        BrightCyan => "96",
        BrightWhite => "97",
        _ => return None,
    })
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    use clap::builder::styling::AnsiColor as A;
    use Color::*;
    Some(match c {
        Black => A::Black,
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Magenta => A::Magenta,
        Cyan => A::Cyan,
        White => A::White,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        BrightYellow => A::BrightYellow,
        BrightBlue => A::BrightBlue,
        BrightMagenta => A::BrightMagenta,
        BrightCyan => A::BrightCyan,
        BrightWhite => A::BrightWhite,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .error(style(StyleRole::Error, false))
}
