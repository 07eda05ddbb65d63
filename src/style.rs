//! Colors, theme and the style run output sink
//!
//! A `StyleRun` covers one stretch of text the renderer is about to paint.
//! Stylers write annotations into it; anything outside the run is clipped.

use crate::error::{Result, StylerError};

/// A highlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse `#rrggbb` or a basic color name
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(StylerError::InvalidColor(s.to_string()));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| StylerError::InvalidColor(s.to_string()))
            };
            return Ok(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        match s.to_lowercase().as_str() {
            "default" => Ok(Color::Default),
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            _ => Err(StylerError::InvalidColor(s.to_string())),
        }
    }
}

/// Theme colors the stylers read at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Used for the matched tag pair
    pub selection_highlight: Color,
    /// Used for search and variable occurrences
    pub search_highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            selection_highlight: Color::Rgb(0x3a, 0x3d, 0x41),
            search_highlight: Color::Rgb(0x61, 0x32, 0x14),
        }
    }
}

/// One annotation written by a styler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Background { start: usize, end: usize, color: Color },
    ShowHidden { start: usize, end: usize, show: bool },
}

impl Annotation {
    pub fn range(&self) -> (usize, usize) {
        match *self {
            Annotation::Background { start, end, .. } => (start, end),
            Annotation::ShowHidden { start, end, .. } => (start, end),
        }
    }
}

/// Append-only annotation sink for `[start, end)` of the document
#[derive(Debug, Clone, Default)]
pub struct StyleRun {
    start: usize,
    end: usize,
    annotations: Vec<Annotation>,
}

impl StyleRun {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
            annotations: Vec::new(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Paint a background color, clipped to the run
    pub fn set_background_color(&mut self, start: usize, end: usize, color: Color) {
        if let Some((start, end)) = self.clip(start, end) {
            self.annotations.push(Annotation::Background { start, end, color });
        }
    }

    /// Toggle display of invisible characters, clipped to the run
    pub fn set_show_hidden(&mut self, start: usize, end: usize, show: bool) {
        if let Some((start, end)) = self.clip(start, end) {
            self.annotations.push(Annotation::ShowHidden { start, end, show });
        }
    }

    /// Everything written so far, for the renderer
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Ranges that received a background color
    pub fn backgrounds(&self) -> Vec<(usize, usize)> {
        self.annotations
            .iter()
            .filter(|a| matches!(a, Annotation::Background { .. }))
            .map(Annotation::range)
            .collect()
    }

    fn clip(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start < end).then_some((start, end))
    }
}
