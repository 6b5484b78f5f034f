//! Terminal styling for command output.
//!
//! Colour and emoji are switched together: a plain terminal gets bracketed
//! tags such as `[OK]` instead of pictographs. The `--color` flag wins over
//! the environment. Under `auto`, `NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE`
//! and `TERM=dumb` are honoured before the terminal itself is asked.
//!
//! ```rust
//! use smartbox_bundle::output::{ColorChoice, OutputConfig, Tone};
//!
//! let out = OutputConfig::new(ColorChoice::Never);
//! assert_eq!(out.icon("📦", "[BUILD]"), "[BUILD]");
//! assert_eq!(out.paint(Tone::Strong, "2.6.0"), "2.6.0");
//! ```

use std::env;

use clap::ValueEnum;
use console::{style, Term};

/// Value of the global `--color` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Emphasis applied by [`OutputConfig::paint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Versions and other key values
    Strong,
    Success,
    Failure,
}

/// Whether command output may use colour and emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => env_preference(|key| {
                env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| Term::stdout().features().colors_supported()),
        };
        Self { use_color }
    }

    /// No colour, no emoji.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.use_color {
            return text.to_string();
        }
        let styled = style(text).force_styling(true);
        match tone {
            Tone::Strong => styled.bold(),
            Tone::Success => styled.green(),
            Tone::Failure => styled.red().bold(),
        }
        .to_string()
    }

    /// `emoji` on a colour terminal, `tag` otherwise.
    pub fn icon<'a>(&self, emoji: &'a str, tag: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            tag
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

/// Colour preference stated by the environment, if any.
///
/// The presence of `NO_COLOR`, even empty, disables colour.
fn env_preference(var: impl Fn(&str) -> Option<String>) -> Option<bool> {
    if var("NO_COLOR").is_some() {
        return Some(false);
    }
    if var("CLICOLOR").as_deref() == Some("0") {
        return Some(false);
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return Some(true);
    }
    if var("TERM").as_deref() == Some("dumb") {
        return Some(false);
    }
    None
}
