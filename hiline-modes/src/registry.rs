//! Syntax registry
//!
//!     Hosts register each syntax once at startup: an id, a display name, a caption for
//!     menus and the file extensions it claims, together with its compiled table. Lookups
//!     go by id or by file path.
//!
//!     Extensions are written the way mode lists write them, `r|rh`, and are matched
//!     case-insensitively against the last extension of a path. When several syntaxes claim
//!     an extension, the one registered first wins.

use crate::rapture;
use hiline_engine::RuleTable;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("syntax '{0}' is already registered")]
    DuplicateId(String),

    #[error("no syntax registered as '{0}'")]
    UnknownSyntax(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDescriptor {
    pub id: String,
    pub name: String,
    pub caption: String,
    pub extensions: Vec<String>,
}

impl SyntaxDescriptor {
    /// `extensions` is a `|`-separated list such as `"r|rh"`.
    pub fn new(id: &str, name: &str, caption: &str, extensions: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            caption: caption.to_string(),
            extensions: parse_extensions(extensions),
        }
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.claims(ext))
    }

    fn claims(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Split an extension list, dropping empty entries and leading dots.
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split('|')
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// A registered syntax: its descriptor and the table that highlights it.
#[derive(Debug, Clone)]
pub struct Syntax {
    pub descriptor: SyntaxDescriptor,
    pub table: Arc<RuleTable>,
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxRegistry {
    syntaxes: Vec<Syntax>,
}

impl SyntaxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in syntax.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.syntaxes.push(Syntax {
            descriptor: SyntaxDescriptor::new(
                rapture::ID,
                rapture::NAME,
                rapture::CAPTION,
                rapture::EXTENSIONS,
            ),
            table: rapture::table(),
        });
        registry
    }

    pub fn register(
        &mut self,
        descriptor: SyntaxDescriptor,
        table: Arc<RuleTable>,
    ) -> Result<(), RegistryError> {
        if self.get(&descriptor.id).is_some() {
            return Err(RegistryError::DuplicateId(descriptor.id));
        }
        log::debug!(
            "registered syntax '{}' for .{}",
            descriptor.id,
            descriptor.extensions.join(", .")
        );
        self.syntaxes.push(Syntax { descriptor, table });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Syntax> {
        self.syntaxes.iter().find(|s| s.descriptor.id == id)
    }

    pub fn for_path(&self, path: &Path) -> Option<&Syntax> {
        self.syntaxes
            .iter()
            .find(|s| s.descriptor.matches_path(path))
    }

    /// Let an already registered syntax claim more extensions.
    pub fn add_extensions(&mut self, id: &str, extensions: &str) -> Result<(), RegistryError> {
        let syntax = self
            .syntaxes
            .iter_mut()
            .find(|s| s.descriptor.id == id)
            .ok_or_else(|| RegistryError::UnknownSyntax(id.to_string()))?;
        for ext in parse_extensions(extensions) {
            if !syntax.descriptor.claims(&ext) {
                syntax.descriptor.extensions.push(ext);
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Syntax> {
        self.syntaxes.iter()
    }

    pub fn len(&self) -> usize {
        self.syntaxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syntaxes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiline_engine::{Grammar, RuleDef};

    fn plain() -> Arc<RuleTable> {
        Arc::new(
            Grammar::new()
                .rules("start", vec![RuleDef::new(r"\w+", "word")])
                .compile()
                .unwrap(),
        )
    }

    #[test]
    fn parses_extension_lists() {
        assert_eq!(parse_extensions("r|rh"), vec!["r", "rh"]);
        assert_eq!(parse_extensions(" .txt||md "), vec!["txt", "md"]);
        assert!(parse_extensions("").is_empty());
    }

    #[test]
    fn builtin_knows_rapture() {
        let registry = SyntaxRegistry::builtin();
        let rapture = registry.get("rapture").unwrap();
        assert_eq!(rapture.descriptor.caption, "Rapture");
        assert_eq!(rapture.descriptor.extensions, vec!["r", "rh"]);

        for path in ["main.r", "lib/defs.rh", "UPPER.RH"] {
            assert_eq!(
                registry.for_path(Path::new(path)).map(|s| s.descriptor.id.as_str()),
                Some("rapture"),
                "{path}"
            );
        }
        assert!(registry.for_path(Path::new("notes.txt")).is_none());
        assert!(registry.for_path(Path::new("r")).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = SyntaxRegistry::builtin();
        let err = registry
            .register(SyntaxDescriptor::new("rapture", "x", "X", "x"), plain())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("rapture".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn first_registered_claims_shared_extension() {
        let mut registry = SyntaxRegistry::new();
        registry
            .register(SyntaxDescriptor::new("one", "one", "One", "txt"), plain())
            .unwrap();
        registry
            .register(SyntaxDescriptor::new("two", "two", "Two", "txt|two"), plain())
            .unwrap();
        let ids: Vec<_> = ["a.txt", "a.two"]
            .iter()
            .filter_map(|p| registry.for_path(Path::new(p)))
            .map(|s| s.descriptor.id.as_str())
            .collect();
        assert_eq!(ids, vec!["one", "two"]);
    }

    #[test]
    fn extra_extensions() {
        let mut registry = SyntaxRegistry::builtin();
        registry.add_extensions("rapture", "rap|R").unwrap();
        assert_eq!(
            registry.get("rapture").unwrap().descriptor.extensions,
            vec!["r", "rh", "rap"]
        );
        assert!(registry.for_path(Path::new("x.rap")).is_some());
        assert_eq!(
            registry.add_extensions("cobol", "cbl").unwrap_err(),
            RegistryError::UnknownSyntax("cobol".into())
        );
    }
}
