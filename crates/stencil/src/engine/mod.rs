//! Template resolution and dispatch.
//!
//! [`Engine`] owns everything a template load needs: the function registry,
//! the extension map, the ordered search-path list and the two path
//! translators. It performs no locking; wrap it in a [`SyncEngine`] to share
//! it between threads.
//!
//! # Loading a Template
//!
//! [`load_template`](TemplateEngine::load_template) runs four steps in order:
//!
//! 1. **Search**: an absolute path must name an existing file. A relative path
//!    is joined to each search path in registration order; the bare join is
//!    tried first, then the join with each known extension appended
//!    (lexicographic order). The first existing file wins.
//! 2. **Dispatch**: the template name comes from the [`NameTranslator`]; the
//!    factory is the one supplied by the caller, or else the one the
//!    [`FactoryTranslator`] picks for the resolved path.
//! 3. **Cache**: if the factory already holds a template under that name it
//!    is returned and the file is not read.
//! 4. **Parse**: the file is read and parsed under that name with a snapshot
//!    of the registered functions.
//!
//! Steps 1 to 3 only look at paths, never at file contents.
//!
//! # Example
//!
//! ```rust,no_run
//! use stencil::{text_factory, Engine, TemplateEngine};
//! use serde_json::json;
//!
//! let mut engine = Engine::new();
//! engine
//!     .add_template_search_path(["./templates"])
//!     .add_template_extension(text_factory(), [".tmpl"]);
//!
//! // ./templates/motd.tmpl
//! let motd = engine.load_template(None, "motd")?;
//! println!("{}", motd.render(&json!({"user": "ops"}))?);
//! # Ok::<(), stencil::TemplateError>(())
//! ```

pub mod extensions;
pub mod fs;
pub mod sync;
pub mod translate;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use minijinja::Value;
use tracing::{debug, trace};

use crate::error::{Result, TemplateError};
use crate::factory::{ParseContext, SharedFactory, SharedTemplate, TemplateFactory};

pub use self::extensions::Extensions;
pub use self::fs::{Filesystem, OsFilesystem};
pub use self::sync::SyncEngine;
pub use self::translate::{
    ExtensionLookup, FactoryTranslator, NameTranslator, SharedFactoryTranslator,
    SharedNameTranslator, StripExtension,
};

/// The operations of a template engine.
///
/// Registration methods return the engine so calls can be chained.
pub trait TemplateEngine: Send {
    /// The translator deriving template names from resolved paths.
    fn name_translator(&self) -> SharedNameTranslator;

    /// Replaces the name translator.
    fn set_name_translator(&mut self, translator: SharedNameTranslator) -> &mut Self;

    /// The translator picking a factory for a resolved path.
    fn factory_translator(&self) -> SharedFactoryTranslator;

    /// Replaces the factory translator.
    fn set_factory_translator(&mut self, translator: SharedFactoryTranslator) -> &mut Self;

    /// Registers a callable under `name`, replacing any previous entry.
    ///
    /// `func` is normally built with [`Value::from_function`].
    fn register_function(&mut self, name: &str, func: Value) -> &mut Self;

    /// Registers a fixed value under `name` in the same registry as the
    /// functions. Templates use it like any other value (`{{ NAME }}`,
    /// `{% if NAME == "prod" %}`, `{{ NAME|upper }}`).
    fn register_variable<V: Into<Value>>(&mut self, name: &str, value: V) -> &mut Self {
        self.register_function(name, value.into())
    }

    /// A snapshot of the registered functions and variables.
    fn parse_context(&self) -> ParseContext;

    /// Parses anonymous text with the registered functions.
    fn parse_template(&self, factory: &dyn TemplateFactory, text: &str) -> Result<SharedTemplate> {
        factory.parse(&self.parse_context(), text)
    }

    /// Parses `text` under `name` with the registered functions.
    fn parse_named_template(
        &self,
        factory: &dyn TemplateFactory,
        name: &str,
        text: &str,
    ) -> Result<SharedTemplate> {
        factory.parse_with_name(&self.parse_context(), name, text)
    }

    /// Binds each extension to `factory`, replacing earlier bindings.
    fn add_template_extension<I>(&mut self, factory: SharedFactory, exts: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>;

    /// Appends each path not already present, keeping registration order.
    fn add_template_search_path<I>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>;

    /// Registered search paths, in priority order.
    fn search_paths(&self) -> Vec<PathBuf>;

    /// A copy of the extension map.
    fn extensions(&self) -> Extensions;

    /// Resolves `path` to an existing file without reading it.
    fn resolve(&self, path: &Path) -> Result<PathBuf>;

    /// Resolves, dispatches and loads a template. See the module docs.
    fn load_template<P: AsRef<Path>>(
        &self,
        factory: Option<SharedFactory>,
        path: P,
    ) -> Result<SharedTemplate>;
}

/// The unsynchronized template engine.
pub struct Engine {
    funcs: BTreeMap<String, Value>,
    extensions: Extensions,
    search_paths: Vec<PathBuf>,
    name_translator: SharedNameTranslator,
    factory_translator: SharedFactoryTranslator,
    fs: Arc<dyn Filesystem>,
}

impl Engine {
    /// An empty engine: no functions, extensions or search paths, the default
    /// translators and the real filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(OsFilesystem))
    }

    /// An empty engine reading templates through `fs`.
    pub fn with_filesystem(fs: Arc<dyn Filesystem>) -> Self {
        Self {
            funcs: BTreeMap::new(),
            extensions: Extensions::new(),
            search_paths: Vec::new(),
            name_translator: Arc::new(StripExtension),
            factory_translator: Arc::new(ExtensionLookup),
            fs,
        }
    }

    fn load_resolved(&self, factory: Option<SharedFactory>, path: &Path) -> Result<SharedTemplate> {
        let name = self.name_translator.name_for_path(path, &self.extensions);
        let factory = match factory {
            Some(factory) => factory,
            None => self
                .factory_translator
                .factory_for_path(path, &self.extensions)
                .ok_or_else(|| TemplateError::NoFactoryForPath {
                    path: path.to_path_buf(),
                })?,
        };

        if let Some(template) = factory.lookup(&name) {
            debug!(name = %name, path = %path.display(), "template cache hit");
            return Ok(template);
        }

        let text = self
            .fs
            .read_to_string(path)
            .map_err(|source| TemplateError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(name = %name, path = %path.display(), "loading template");
        factory.parse_with_name(&self.parse_context(), &name, &text)
    }

    fn candidate_exists(&self, candidate: &Path) -> bool {
        let found = self.fs.is_file(candidate);
        trace!(candidate = %candidate.display(), found, "probing template path");
        found
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("funcs", &self.funcs.keys().collect::<Vec<_>>())
            .field("extensions", &self.extensions)
            .field("search_paths", &self.search_paths)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine for Engine {
    fn name_translator(&self) -> SharedNameTranslator {
        Arc::clone(&self.name_translator)
    }

    fn set_name_translator(&mut self, translator: SharedNameTranslator) -> &mut Self {
        self.name_translator = translator;
        self
    }

    fn factory_translator(&self) -> SharedFactoryTranslator {
        Arc::clone(&self.factory_translator)
    }

    fn set_factory_translator(&mut self, translator: SharedFactoryTranslator) -> &mut Self {
        self.factory_translator = translator;
        self
    }

    fn register_function(&mut self, name: &str, func: Value) -> &mut Self {
        self.funcs.insert(name.to_string(), func);
        self
    }

    fn parse_context(&self) -> ParseContext {
        ParseContext::new(self.funcs.clone())
    }

    fn add_template_extension<I>(&mut self, factory: SharedFactory, exts: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for ext in exts {
            self.extensions.insert(ext, Arc::clone(&factory));
        }
        self
    }

    fn add_template_search_path<I>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        for path in paths {
            let path = path.into();
            if !self.search_paths.contains(&path) {
                self.search_paths.push(path);
            }
        }
        self
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        self.search_paths.clone()
    }

    fn extensions(&self) -> Extensions {
        self.extensions.clone()
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return if self.candidate_exists(path) {
                Ok(path.to_path_buf())
            } else {
                Err(TemplateError::NotFound {
                    path: path.to_path_buf(),
                })
            };
        }

        for dir in &self.search_paths {
            let candidate = absolutize(&dir.join(path))?;
            if self.candidate_exists(&candidate) {
                return Ok(candidate);
            }
            for ext in self.extensions.keys() {
                let mut with_ext = candidate.clone().into_os_string();
                with_ext.push(ext);
                let with_ext = PathBuf::from(with_ext);
                if self.candidate_exists(&with_ext) {
                    return Ok(with_ext);
                }
            }
        }

        Err(TemplateError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn load_template<P: AsRef<Path>>(
        &self,
        factory: Option<SharedFactory>,
        path: P,
    ) -> Result<SharedTemplate> {
        let path = path.as_ref();
        let resolved = self.resolve(path)?;
        debug!(
            requested = %path.display(),
            resolved = %resolved.display(),
            "resolved template path"
        );
        self.load_resolved(factory, &resolved)
    }
}

/// Makes `path` absolute against the current directory and drops `.` parts.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}
