//! Session state
//!
//! A [`Session`] is the explicit context every operation runs against: the
//! rules directory, the preferences, the symbol table, the current tree, the
//! navigation state and the latest braille rendering. Several sessions can
//! live side by side.
//!
//! Operations either succeed completely or leave the session untouched.

pub mod prefs;

use crate::braille::{self, BrailleCode, BrailleMap};
use crate::navigate::{command_for_key, Modifiers, NavCommand, NavOutput, NavigationLocation, Navigator};
use crate::rules::{RuleContext, SymbolTable};
use crate::speech::{self, SUPPORTED_STYLES};
use crate::tree::{annotate, parse, to_mathml, ExpressionNode, Tree};
use crate::{MathError, Result};
use log::{debug, info};
use prefs::{Preferences, SUPPORTED_LANGUAGES};
use std::path::{Path, PathBuf};

/// Preference file read from the rules directory
pub const PREFS_FILE: &str = "prefs.ini";
/// Per-language symbol file, under `<rules>/<language>/`
pub const SYMBOLS_FILE: &str = "unicode.ini";

/// One user's math reading session
#[derive(Debug, Default)]
pub struct Session {
    rules_dir: Option<PathBuf>,
    prefs: Preferences,
    symbols: SymbolTable,
    tree: Option<Tree>,
    navigator: Navigator,
    braille_map: BrailleMap,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the session at its rules directory
    ///
    /// `prefs.ini` in the directory (if present) is applied on top of the
    /// current preferences, and `<language>/unicode.ini` replaces the symbol
    /// overrides.
    pub fn set_rules_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MathError::RulesDir(format!(
                "'{}' is not a directory",
                dir.display()
            )));
        }

        let mut prefs = self.prefs.clone();
        let prefs_path = dir.join(PREFS_FILE);
        if prefs_path.is_file() {
            let applied = prefs.load_ini(&prefs_path)?;
            info!("Applied {} preferences from {:?}", applied, prefs_path);
        }
        let symbols = load_symbols(dir, prefs.language())?;

        info!("Rules directory set to {:?}", dir);
        self.rules_dir = Some(dir.to_path_buf());
        self.prefs = prefs;
        self.symbols = symbols;
        Ok(())
    }

    pub fn rules_dir(&self) -> Option<&Path> {
        self.rules_dir.as_deref()
    }

    /// Replace the current expression
    ///
    /// Returns the annotated markup. The navigation location and the braille
    /// map are reset; placemarkers survive.
    pub fn set_mathml(&mut self, markup: &str) -> Result<String> {
        if self.rules_dir.is_none() {
            return Err(MathError::RulesDir(
                "the rules directory must be set before any MathML".to_string(),
            ));
        }
        let mut root = parse(markup)?;
        annotate(&mut root)?;
        let annotated = to_mathml(&root);

        let tree = Tree::new(root);
        debug!("New expression with {} nodes", tree.len());
        self.tree = Some(tree);
        self.navigator.reset();
        self.braille_map.clear();
        Ok(annotated)
    }

    fn tree(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or(MathError::NoExpression)
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(&self.prefs, &self.symbols)
    }

    fn node(&self, id: &str) -> Result<&ExpressionNode> {
        self.tree()?
            .find(id)
            .ok_or_else(|| MathError::UnknownNodeId(id.to_string()))
    }

    /// Speech for the whole expression
    pub fn spoken_text(&self) -> Result<String> {
        let tree = self.tree()?;
        Ok(speech::speak(self.context(), tree.root()))
    }

    /// Speech for one node, optionally in the verbose "describe" form
    pub fn speech_for(&self, id: &str, describe: bool) -> Result<String> {
        let node = self.node(id)?;
        let ctx = if describe {
            self.context().describing()
        } else {
            self.context()
        };
        Ok(speech::speak(ctx, node))
    }

    /// Braille for the whole expression
    ///
    /// The rendering becomes the one braille positions are resolved against.
    /// A non-empty `nav_id` has its cells highlighted per BrailleNavHighlight.
    pub fn braille(&mut self, nav_id: &str) -> Result<String> {
        let tree = self.tree()?;
        if !nav_id.is_empty() && !tree.contains(nav_id) {
            return Err(MathError::UnknownNodeId(nav_id.to_string()));
        }
        let rendering = braille::render(self.context(), tree.root());
        let text = if nav_id.is_empty() || !self.prefs.braille_code().is_unicode() {
            rendering.text.clone()
        } else {
            braille::highlight(&rendering, nav_id, self.prefs.nav_highlight())
        };
        self.braille_map.record(rendering);
        Ok(text)
    }

    /// Braille for the navigation focus alone
    pub fn navigation_braille(&self) -> Result<String> {
        let tree = self.tree()?;
        let node = self.navigator.current_node(tree);
        Ok(braille::render(self.context(), node).text)
    }

    pub fn set_preference(&mut self, name: &str, value: &str) -> Result<()> {
        let mut prefs = self.prefs.clone();
        prefs.set(name, value)?;

        let language_changed = prefs.language() != self.prefs.language();
        let symbols = match &self.rules_dir {
            Some(dir) if language_changed => Some(load_symbols(dir, prefs.language())?),
            _ => None,
        };

        self.prefs = prefs;
        if let Some(symbols) = symbols {
            self.symbols = symbols;
        }
        Ok(())
    }

    pub fn preference(&self, name: &str) -> Result<String> {
        self.prefs.get(name)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Run a navigation command given by name
    pub fn navigate_command(&mut self, command: &str) -> Result<NavOutput> {
        let command: NavCommand = command.parse()?;
        self.navigate(command)
    }

    /// Run the navigation command bound to a key chord
    pub fn navigate_key(&mut self, key: u32, modifiers: Modifiers) -> Result<NavOutput> {
        let command = command_for_key(key, modifiers)?;
        self.navigate(command)
    }

    fn navigate(&mut self, command: NavCommand) -> Result<NavOutput> {
        let tree = self.tree.as_ref().ok_or(MathError::NoExpression)?;
        // Work on copies so that a failing command changes nothing
        let mut navigator = self.navigator.clone();
        let mut prefs = self.prefs.clone();
        let output = navigator.execute(command, tree, &mut prefs, &self.symbols)?;
        self.navigator = navigator;
        self.prefs = prefs;
        Ok(output)
    }

    /// The navigation location (empty until the user navigates)
    pub fn navigation_location(&self) -> Result<NavigationLocation> {
        self.tree()?;
        Ok(self.navigator.location().clone())
    }

    pub fn set_navigation_location(&mut self, location: &NavigationLocation) -> Result<()> {
        let tree = self.tree.as_ref().ok_or(MathError::NoExpression)?;
        self.navigator.set_location(tree, location)
    }

    /// The node that produced the braille cell at `position`
    pub fn location_from_braille_position(&self, position: usize) -> Result<NavigationLocation> {
        self.tree()?;
        let id = self.braille_map.location_at(position)?;
        Ok(NavigationLocation::node(id))
    }

    /// Annotated markup of the navigation focus
    pub fn navigation_mathml(&self) -> Result<String> {
        let tree = self.tree()?;
        Ok(to_mathml(self.navigator.current_node(tree)))
    }

    pub fn supported_braille_codes() -> Vec<&'static str> {
        BrailleCode::ALL.iter().map(|code| code.name()).collect()
    }

    pub fn supported_languages() -> Vec<&'static str> {
        SUPPORTED_LANGUAGES.to_vec()
    }

    /// Speech styles available for `language` (none for unsupported ones)
    pub fn supported_speech_styles(language: &str) -> Vec<&'static str> {
        let base = language.split(['-', '_']).next().unwrap_or_default();
        if SUPPORTED_LANGUAGES
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(base))
        {
            SUPPORTED_STYLES.to_vec()
        } else {
            Vec::new()
        }
    }
}

/// Symbol table for a language, with `unicode.ini` overrides if present
fn load_symbols(dir: &Path, language: &str) -> Result<SymbolTable> {
    let base = language.split(['-', '_']).next().unwrap_or(language);
    let path = dir.join(base).join(SYMBOLS_FILE);
    if !path.is_file() {
        debug!("No symbol file at {:?}, using built-in names", path);
        return Ok(SymbolTable::new());
    }
    let symbols = SymbolTable::load(&path)?;
    info!("Loaded {} symbol names from {:?}", symbols.len(), path);
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.set_rules_dir(dir.path()).unwrap();
        (session, dir)
    }

    #[test]
    fn test_rules_dir_required() {
        let mut session = Session::new();
        assert!(matches!(
            session.set_mathml("<math><mi>x</mi></math>"),
            Err(MathError::RulesDir(_))
        ));
        assert!(session.set_rules_dir("/no/such/mathreader/dir").is_err());
    }

    #[test]
    fn test_no_expression() {
        let (mut session, _dir) = session();
        assert!(matches!(session.spoken_text(), Err(MathError::NoExpression)));
        assert!(matches!(
            session.navigate_command("ZoomIn"),
            Err(MathError::NoExpression)
        ));
    }

    #[test]
    fn test_bad_markup_keeps_tree() {
        let (mut session, _dir) = session();
        session.set_mathml("<math><mi>x</mi></math>").unwrap();
        assert!(session.set_mathml("<math><mi>x</math>").is_err());
        assert_eq!(session.spoken_text().unwrap(), "x");
    }

    #[test]
    fn test_failed_preference_changes_nothing() {
        let (mut session, _dir) = session();
        assert!(session.set_preference("Verbosity", "Loud").is_err());
        assert_eq!(session.preference("Verbosity").unwrap(), "Medium");
    }

    #[test]
    fn test_supported_lists() {
        assert_eq!(
            Session::supported_braille_codes(),
            vec!["Nemeth", "LaTeX", "ASCIIMath"]
        );
        assert_eq!(Session::supported_speech_styles("en-GB").len(), 2);
        assert!(Session::supported_speech_styles("fr").is_empty());
    }
}
