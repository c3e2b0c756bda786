//! Path translators.
//!
//! After a path is resolved the engine asks two translators what to do with
//! it: [`NameTranslator`] derives the template name used for the factory
//! cache, and [`FactoryTranslator`] picks the factory when the caller did not
//! supply one. Both are total: "no match" is the unchanged base name or
//! `None`, never an error.
//!
//! Closures with the matching signature implement the traits, so overriding
//! one is a one-liner:
//!
//! ```rust
//! use std::path::Path;
//! use std::sync::Arc;
//! use stencil::{Engine, Extensions, TemplateEngine};
//!
//! let mut engine = Engine::new();
//! engine.set_name_translator(Arc::new(|path: &Path, _: &Extensions| {
//!     path.to_string_lossy().into_owned()
//! }));
//! ```

use std::path::Path;
use std::sync::Arc;

use super::extensions::Extensions;
use crate::factory::SharedFactory;

/// A name translator shared with an engine.
pub type SharedNameTranslator = Arc<dyn NameTranslator>;

/// A factory translator shared with an engine.
pub type SharedFactoryTranslator = Arc<dyn FactoryTranslator>;

/// Maps a resolved template path to a template name.
pub trait NameTranslator: Send + Sync {
    fn name_for_path(&self, path: &Path, extensions: &Extensions) -> String;
}

/// Maps a resolved template path to the factory that parses it.
pub trait FactoryTranslator: Send + Sync {
    fn factory_for_path(&self, path: &Path, extensions: &Extensions) -> Option<SharedFactory>;
}

impl<F> NameTranslator for F
where
    F: Fn(&Path, &Extensions) -> String + Send + Sync,
{
    fn name_for_path(&self, path: &Path, extensions: &Extensions) -> String {
        self(path, extensions)
    }
}

impl<F> FactoryTranslator for F
where
    F: Fn(&Path, &Extensions) -> Option<SharedFactory> + Send + Sync,
{
    fn factory_for_path(&self, path: &Path, extensions: &Extensions) -> Option<SharedFactory> {
        self(path, extensions)
    }
}

/// Default name translator: the file's base name with one known extension
/// removed.
///
/// `"dir/a.b.tmpl"` becomes `"a.b"` when `.tmpl` is known; an unknown
/// extension leaves the base name untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripExtension;

impl NameTranslator for StripExtension {
    fn name_for_path(&self, path: &Path, extensions: &Extensions) -> String {
        let base = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match extensions.matching_suffix(&base) {
            Some(ext) => base[..base.len() - ext.len()].to_string(),
            None => base,
        }
    }
}

/// Default factory translator: exact lookup of the path's last extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionLookup;

impl FactoryTranslator for ExtensionLookup {
    fn factory_for_path(&self, path: &Path, extensions: &Extensions) -> Option<SharedFactory> {
        let ext = path.extension()?.to_str()?;
        extensions.get(&format!(".{ext}")).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::MiniJinjaFactory;

    fn exts() -> (Extensions, SharedFactory) {
        let factory: SharedFactory = Arc::new(MiniJinjaFactory::text());
        let mut exts = Extensions::new();
        exts.insert(".ext", factory.clone());
        (exts, factory)
    }

    #[test]
    fn test_strip_exactly_one_known_suffix() {
        let (exts, _) = exts();
        let name = StripExtension.name_for_path(Path::new("/t/a.b.ext"), &exts);
        assert_eq!(name, "a.b");
    }

    #[test]
    fn test_unknown_extension_keeps_base_name() {
        let (exts, _) = exts();
        let name = StripExtension.name_for_path(Path::new("/t/a.b.other"), &exts);
        assert_eq!(name, "a.b.other");
        let name = StripExtension.name_for_path(Path::new("plain"), &exts);
        assert_eq!(name, "plain");
    }

    #[test]
    fn test_factory_lookup_by_last_extension() {
        let (exts, factory) = exts();
        let found = ExtensionLookup
            .factory_for_path(Path::new("x/a.b.ext"), &exts)
            .unwrap();
        assert!(Arc::ptr_eq(&found, &factory));
        assert!(ExtensionLookup
            .factory_for_path(Path::new("x/a.ext.b"), &exts)
            .is_none());
        assert!(ExtensionLookup
            .factory_for_path(Path::new("x/noext"), &exts)
            .is_none());
    }

    #[test]
    fn test_closures_are_translators() {
        let (exts, _) = exts();
        let upper = |path: &Path, _: &Extensions| path.display().to_string().to_uppercase();
        assert_eq!(upper.name_for_path(Path::new("a.ext"), &exts), "A.EXT");

        let never = |_: &Path, _: &Extensions| -> Option<SharedFactory> { None };
        assert!(never.factory_for_path(Path::new("a.ext"), &exts).is_none());
    }
}
