//! mathreader - MathML speech, braille and navigation
//!
//! Renders MathML as English speech (SimpleSpeak or ClearSpeak) and as
//! braille (Nemeth, LaTeX or ASCIIMath), and lets a user explore the
//! expression structure one piece at a time.

pub mod api;
pub mod braille;
pub mod error;
pub mod navigate;
pub mod rules;
pub mod speech;
pub mod state;
pub mod tree;

pub use api::Interface;
pub use error::{ErrorKind, MathError, Result};
pub use navigate::NavigationLocation;
pub use state::Session;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "mathreader";
