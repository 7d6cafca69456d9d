//! Character name lookup for speech
//!
//! Built-in English names for operators, fences and Greek letters. A rules
//! directory may override or extend them with `<lang>/unicode.ini`, whose
//! `[symbols]` section maps decimal code points to names:
//!
//! ```ini
//! [symbols]
//! 43=plus
//! 8730=square root
//! ```

use crate::{MathError, Result};
use ini::Ini;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

static BUILTIN: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    let names: &[(char, &str)] = &[
        ('+', "plus"),
        ('-', "minus"),
        ('−', "minus"),
        ('±', "plus or minus"),
        ('∓', "minus or plus"),
        ('×', "times"),
        ('⋅', "times"),
        ('·', "times"),
        ('*', "times"),
        ('÷', "divided by"),
        ('/', "divided by"),
        ('=', "equals"),
        ('≠', "is not equal to"),
        ('<', "is less than"),
        ('>', "is greater than"),
        ('≤', "is less than or equal to"),
        ('≥', "is greater than or equal to"),
        ('≈', "is approximately equal to"),
        ('≡', "is congruent to"),
        ('∼', "is similar to"),
        ('∝', "is proportional to"),
        ('∈', "is an element of"),
        ('∉', "is not an element of"),
        ('⊂', "is a subset of"),
        ('⊆', "is a subset of or equal to"),
        ('∪', "union"),
        ('∩', "intersection"),
        ('→', "right arrow"),
        ('←', "left arrow"),
        ('⇒', "implies"),
        ('⇔', "if and only if"),
        ('∞', "infinity"),
        ('∂', "partial"),
        ('∇', "del"),
        ('∑', "sum"),
        ('∏', "product"),
        ('∫', "integral"),
        ('∮', "contour integral"),
        ('√', "square root"),
        ('!', "factorial"),
        ('%', "percent"),
        ('′', "prime"),
        ('″', "double prime"),
        ('°', "degrees"),
        ('(', "open paren"),
        (')', "close paren"),
        ('[', "open bracket"),
        (']', "close bracket"),
        ('{', "open brace"),
        ('}', "close brace"),
        ('|', "vertical line"),
        ('‖', "double vertical line"),
        ('⟨', "open angle"),
        ('⟩', "close angle"),
        (',', "comma"),
        (';', "semicolon"),
        (':', "colon"),
        ('…', "dot dot dot"),
        ('⋯', "dot dot dot"),
        ('¯', "bar"),
        ('‾', "bar"),
        ('^', "hat"),
        ('ˆ', "hat"),
        ('~', "tilde"),
        ('˜', "tilde"),
        ('˙', "dot"),
        ('α', "alpha"),
        ('β', "beta"),
        ('γ', "gamma"),
        ('δ', "delta"),
        ('ε', "epsilon"),
        ('ζ', "zeta"),
        ('η', "eta"),
        ('θ', "theta"),
        ('ι', "iota"),
        ('κ', "kappa"),
        ('λ', "lambda"),
        ('μ', "mu"),
        ('ν', "nu"),
        ('ξ', "xi"),
        ('π', "pi"),
        ('ρ', "rho"),
        ('σ', "sigma"),
        ('τ', "tau"),
        ('υ', "upsilon"),
        ('φ', "phi"),
        ('χ', "chi"),
        ('ψ', "psi"),
        ('ω', "omega"),
        ('Γ', "cap gamma"),
        ('Δ', "cap delta"),
        ('Θ', "cap theta"),
        ('Λ', "cap lambda"),
        ('Π', "cap pi"),
        ('Σ', "cap sigma"),
        ('Φ', "cap phi"),
        ('Ψ', "cap psi"),
        ('Ω', "cap omega"),
    ];
    names.iter().map(|&(ch, name)| (ch as u32, name)).collect()
});

/// Invisible operators (function application, times, separator, plus)
pub fn is_invisible(ch: char) -> bool {
    ('\u{2061}'..='\u{2064}').contains(&ch)
}

/// Character names in effect for one language
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    overrides: HashMap<u32, String>,
}

impl SymbolTable {
    /// Built-in names only
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a `unicode.ini` file
    pub fn load(path: &Path) -> Result<Self> {
        let ini = Ini::load_from_file(path)
            .map_err(|e| MathError::IniParse(format!("Failed to load {:?}: {}", path, e)))?;

        let mut overrides = HashMap::new();
        if let Some(section) = ini.section(Some("symbols")) {
            for (key, value) in section.iter() {
                if let Ok(code) = key.trim().parse::<u32>() {
                    overrides.insert(code, value.trim().to_string());
                }
            }
        }
        debug!("Loaded {} symbols from {:?}", overrides.len(), path);
        Ok(Self { overrides })
    }

    /// Spoken name for a character, if it has one
    pub fn name(&self, ch: char) -> Option<&str> {
        let code = ch as u32;
        self.overrides
            .get(&code)
            .map(String::as_str)
            .or_else(|| BUILTIN.get(&code).copied())
    }

    /// Number of overriding entries
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_names() {
        let symbols = SymbolTable::new();
        assert_eq!(symbols.name('+'), Some("plus"));
        assert_eq!(symbols.name('('), Some("open paren"));
        assert_eq!(symbols.name('π'), Some("pi"));
        assert_eq!(symbols.name('x'), None);
    }

    #[test]
    fn test_invisible() {
        assert!(is_invisible('\u{2062}'));
        assert!(!is_invisible('+'));
    }

    #[test]
    fn test_overrides_from_ini() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[symbols]\n43=positive\n9731=snowman\nbogus=skip").unwrap();
        let symbols = SymbolTable::load(file.path()).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols.name('+'), Some("positive"));
        assert_eq!(symbols.name('☃'), Some("snowman"));
        assert_eq!(symbols.name('='), Some("equals"));
    }
}
