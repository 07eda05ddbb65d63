//! live-stylers - incremental, edit-aware stylers for text editors
//!
//! The host editor owns the document, the caret and the settings. It hands
//! them to each styler through a [`StyleContext`], forwards every edit as an
//! `insert`/`delete` call, gives the stylers an idle slot, and asks them to
//! paint a [`StyleRun`] whenever a region is rendered.
//!
//! Two stylers ship here:
//! - [`VariableHighlighter`] marks the other occurrences of the word under
//!   the caret, after a debounce period
//! - [`TagStyler`] marks the HTML/XML open and close tags enclosing the caret

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod interval;
pub mod style;
pub mod styler;

#[cfg(test)]
mod testing;

pub use clock::{Clock, Debounce, ManualClock, SystemClock};
pub use config::Config;
pub use document::{Change, Document, EditorView, Settings};
pub use error::{Result, StylerError};
pub use interval::{IntervalStore, Ranged, TextInterval};
pub use style::{Annotation, Color, StyleRun, Theme};
pub use styler::{
    filter_match, SearchHighlighter, SearchOptions, StyleContext, Styler, TagInterval, TagStyler,
    Validity, VariableHighlighter, HIGHLIGHT_HTML, HIGHLIGHT_VARIABLES,
};
