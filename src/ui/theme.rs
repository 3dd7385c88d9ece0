use ratatui::style::{Color, Modifier, Style};

/// Palette for the views. With colors disabled every style collapses to the
/// terminal default plus modifiers.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    colors: bool,
}

impl Theme {
    pub fn new(no_colors: bool) -> Self {
        Self { colors: !no_colors }
    }

    fn fg(&self, color: Color) -> Style {
        if self.colors {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    pub fn text(&self) -> Style {
        self.fg(Color::Gray)
    }

    pub fn muted(&self) -> Style {
        if self.colors {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    pub fn accent(&self) -> Style {
        self.fg(Color::Cyan)
    }

    pub fn value(&self) -> Style {
        self.fg(Color::Yellow)
    }

    pub fn success(&self) -> Style {
        self.fg(Color::Green)
    }

    pub fn warning(&self) -> Style {
        self.fg(Color::Yellow).add_modifier(Modifier::ITALIC)
    }

    pub fn error(&self) -> Style {
        self.fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        self.fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        if self.colors {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monochrome_has_no_colors() {
        let theme = Theme::new(true);
        for style in [theme.text(), theme.accent(), theme.error(), theme.selected()] {
            assert_eq!(style.fg, None);
            assert_eq!(style.bg, None);
        }
        assert_eq!(Theme::new(false).accent().fg, Some(Color::Cyan));
    }
}
