//! String call boundary
//!
//! [`Interface`] exposes a [`Session`] the way a screen reader host drives
//! it: strings in, strings out. A failing call returns an empty string (or a
//! location with an empty id) and leaves its message in a single slot that
//! [`Interface::get_error`] reads and clears.

use crate::navigate::{Modifiers, NavOutput, NavigationLocation};
use crate::state::Session;
use crate::{Result, VERSION};
use log::warn;
use std::path::Path;

/// Returned by calls that succeed without a value of their own
pub const OK: &str = "Ok";
/// Returned by navigation when the user asks to leave
pub const EXIT: &str = "Exit";

#[derive(Debug, Default)]
pub struct Interface {
    session: Session,
    last_error: String,
}

impl Interface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The message of the last failure, then empty until the next one
    pub fn get_error(&mut self) -> String {
        std::mem::take(&mut self.last_error)
    }

    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}", e);
                self.last_error = e.to_string();
                None
            }
        }
    }

    fn text(&mut self, result: Result<String>) -> String {
        self.report(result).unwrap_or_default()
    }

    fn unit(&mut self, result: Result<()>) -> String {
        match self.report(result) {
            Some(()) => OK.to_string(),
            None => String::new(),
        }
    }

    fn location(&mut self, result: Result<NavigationLocation>) -> NavigationLocation {
        self.report(result).unwrap_or_default()
    }

    pub fn version(&self) -> String {
        VERSION.to_string()
    }

    pub fn set_rules_dir(&mut self, dir: impl AsRef<Path>) -> String {
        let result = self.session.set_rules_dir(dir);
        self.unit(result)
    }

    /// Returns the annotated markup
    pub fn set_mathml(&mut self, markup: &str) -> String {
        let result = self.session.set_mathml(markup);
        self.text(result)
    }

    pub fn spoken_text(&mut self) -> String {
        let result = self.session.spoken_text();
        self.text(result)
    }

    pub fn set_preference(&mut self, name: &str, value: &str) -> String {
        let result = self.session.set_preference(name, value);
        self.unit(result)
    }

    pub fn preference(&mut self, name: &str) -> String {
        let result = self.session.preference(name);
        self.text(result)
    }

    pub fn braille(&mut self, nav_id: &str) -> String {
        let result = self.session.braille(nav_id);
        self.text(result)
    }

    pub fn navigation_braille(&mut self) -> String {
        let result = self.session.navigation_braille();
        self.text(result)
    }

    pub fn navigate_key(
        &mut self,
        key: u32,
        shift: bool,
        control: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let modifiers = Modifiers {
            shift,
            control,
            alt,
            meta,
        };
        let result = self.session.navigate_key(key, modifiers);
        self.navigation(result)
    }

    pub fn navigate_command(&mut self, command: &str) -> String {
        let result = self.session.navigate_command(command);
        self.navigation(result)
    }

    fn navigation(&mut self, result: Result<NavOutput>) -> String {
        match self.report(result) {
            Some(NavOutput::Speech(text)) => text,
            Some(NavOutput::Exit) => EXIT.to_string(),
            None => String::new(),
        }
    }

    pub fn navigation_mathml(&mut self) -> String {
        let result = self.session.navigation_mathml();
        self.text(result)
    }

    pub fn navigation_location(&mut self) -> NavigationLocation {
        let result = self.session.navigation_location();
        self.location(result)
    }

    pub fn set_navigation_location(&mut self, location: &NavigationLocation) -> String {
        let result = self.session.set_navigation_location(location);
        self.unit(result)
    }

    pub fn location_from_braille_position(&mut self, position: usize) -> NavigationLocation {
        let result = self.session.location_from_braille_position(position);
        self.location(result)
    }

    pub fn supported_braille_codes(&self) -> Vec<String> {
        to_strings(Session::supported_braille_codes())
    }

    pub fn supported_languages(&self) -> Vec<String> {
        to_strings(Session::supported_languages())
    }

    pub fn supported_speech_styles(&self, language: &str) -> Vec<String> {
        to_strings(Session::supported_speech_styles(language))
    }
}

fn to_strings(names: Vec<&'static str>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}
