//! Colors for the run report, one per kind of outcome.

use std::fmt::Display;

use owo_colors::{OwoColorize, Style};

/// Outcome roles used across the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Pass,
    Finding,
    Unexpected,
    Muted,
    Header,
    Code,
}

impl Role {
    pub fn style(self) -> Style {
        match self {
            Role::Pass => Style::new().green().bold(),
            Role::Finding => Style::new().red().bold(),
            Role::Unexpected => Style::new().yellow(),
            Role::Muted => Style::new().dimmed(),
            Role::Header => Style::new().bold(),
            Role::Code => Style::new().blue(),
        }
    }

    /// Renders `value` in this role, or plain when colors are off.
    pub fn paint(self, value: &impl Display) -> String {
        if super::no_color() {
            value.to_string()
        } else {
            value.style(self.style()).to_string()
        }
    }
}

/// Shorthand for [`Role::paint`] on anything displayable.
pub trait SemanticStyle: Display + Sized {
    fn success(&self) -> String {
        Role::Pass.paint(self)
    }

    fn error(&self) -> String {
        Role::Finding.paint(self)
    }

    fn warning(&self) -> String {
        Role::Unexpected.paint(self)
    }

    fn muted(&self) -> String {
        Role::Muted.paint(self)
    }

    fn header(&self) -> String {
        Role::Header.paint(self)
    }

    fn code(&self) -> String {
        Role::Code.paint(self)
    }
}

impl<T: Display> SemanticStyle for T {}
