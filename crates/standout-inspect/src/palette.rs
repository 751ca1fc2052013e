//! Color registry for both output channels.
//!
//! Every piece of rendered output belongs to a semantic [`Category`]. The registry
//! maps a category to a presentation [`Token`] for each [`Channel`]: a CSS color for
//! the interactive (HTML) channel, a terminal color for the flat channel.
//!
//! The table is static. Lookups by name fall back to the `null` category instead of
//! failing, so a renderer never has to handle a missing color.
//!
//! ```rust
//! use standout_inspect::palette::{color_for, color_for_name, Category, Channel, Token};
//!
//! assert_eq!(color_for(Channel::Interactive, Category::String), Token::Css("#56db3a"));
//! assert_eq!(
//!     color_for_name(Channel::Flat, "no-such-category"),
//!     color_for(Channel::Flat, Category::Null),
//! );
//! ```

use console::{Color, Style};

/// Output channel a token is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Collapsible HTML markup.
    Interactive,
    /// Line-oriented terminal text.
    Flat,
}

/// Semantic category of a rendered span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Sequence,
    Record,
    Key,
    Field,
    Handle,
}

impl Category {
    /// Looks up a category by its lowercase name.
    pub fn from_name(name: &str) -> Option<Category> {
        PALETTE
            .iter()
            .find(|(_, n, _, _)| *n == name)
            .map(|(category, _, _, _)| *category)
    }

    pub fn name(self) -> &'static str {
        row(self).1
    }
}

/// A presentation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// CSS color value for the interactive channel.
    Css(&'static str),
    /// Terminal foreground color for the flat channel.
    Ansi(Color),
}

impl Token {
    /// Builds a terminal style for this token.
    ///
    /// Styling is forced on: whether escapes are wanted at all is decided by the
    /// renderer, not by the environment at paint time.
    pub fn style(self) -> Style {
        match self {
            Token::Ansi(color) => Style::new().fg(color).force_styling(true),
            Token::Css(_) => Style::new(),
        }
    }

    /// The CSS color, if this is an interactive token.
    pub fn css(self) -> Option<&'static str> {
        match self {
            Token::Css(css) => Some(css),
            Token::Ansi(_) => None,
        }
    }
}

type Row = (Category, &'static str, &'static str, Color);

const PALETTE: [Row; 10] = [
    (Category::String, "string", "#56db3a", Color::Green),
    (Category::Integer, "integer", "#1299da", Color::Blue),
    (Category::Float, "float", "#4fb4e8", Color::Cyan),
    (Category::Boolean, "boolean", "#ff8400", Color::Yellow),
    (Category::Null, "null", "#b729d9", Color::Magenta),
    (Category::Sequence, "sequence", "#e8a33d", Color::Color256(214)),
    (Category::Record, "record", "#d7ba7d", Color::Color256(180)),
    (Category::Key, "key", "#9cdcfe", Color::Color256(117)),
    (Category::Field, "field", "#c586c0", Color::Color256(176)),
    (Category::Handle, "handle", "#ff5555", Color::Red),
];

fn row(category: Category) -> &'static Row {
    // The table has one row per category; the fallback is unreachable in practice.
    PALETTE
        .iter()
        .find(|r| r.0 == category)
        .unwrap_or(&PALETTE[4])
}

/// Returns the token for a category on a channel.
pub fn color_for(channel: Channel, category: Category) -> Token {
    let (_, _, css, color) = *row(category);
    match channel {
        Channel::Interactive => Token::Css(css),
        Channel::Flat => Token::Ansi(color),
    }
}

/// Returns the token for a category given by name, falling back to `null`.
pub fn color_for_name(channel: Channel, name: &str) -> Token {
    let category = Category::from_name(name).unwrap_or(Category::Null);
    color_for(channel, category)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORIES: [Category; 10] = [
        Category::String,
        Category::Integer,
        Category::Float,
        Category::Boolean,
        Category::Null,
        Category::Sequence,
        Category::Record,
        Category::Key,
        Category::Field,
        Category::Handle,
    ];

    #[test]
    fn test_every_category_has_both_tokens() {
        for category in CATEGORIES {
            assert!(matches!(
                color_for(Channel::Interactive, category),
                Token::Css(_)
            ));
            assert!(matches!(color_for(Channel::Flat, category), Token::Ansi(_)));
        }
    }

    #[test]
    fn test_name_round_trip() {
        for category in CATEGORIES {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_null() {
        assert_eq!(Category::from_name("sparkles"), None);
        assert_eq!(
            color_for_name(Channel::Interactive, "sparkles"),
            color_for(Channel::Interactive, Category::Null)
        );
    }

    #[test]
    fn test_ansi_style_wraps_with_reset() {
        let styled = color_for(Channel::Flat, Category::String)
            .style()
            .apply_to("x")
            .to_string();
        assert!(styled.starts_with("\x1b["));
        assert!(styled.ends_with("\x1b[0m"));
        assert!(styled.contains('x'));
    }
}
