//! Thread-safe engine decorator.
//!
//! [`SyncEngine`] puts a single mutex in front of an engine. Every operation,
//! registration, translator access, parse and load alike, holds the lock for
//! its whole duration, so each call sees every effect of the calls that
//! completed before it. Templates returned by the engine are rendered outside
//! the lock.
//!
//! The inherent methods take `&self` so a `SyncEngine` can sit in a static or
//! an `Arc`. It also implements [`TemplateEngine`], so it fits wherever an
//! engine is expected; with `&mut` access those calls go straight to the
//! engine.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use stencil::{text_factory, Engine, SyncEngine};
//! use minijinja::Value;
//!
//! let engine = Arc::new(SyncEngine::new(Engine::new()));
//! let worker = {
//!     let engine = Arc::clone(&engine);
//!     thread::spawn(move || {
//!         engine.register_function("one", Value::from_function(|| 1));
//!     })
//! };
//! engine.register_function("two", Value::from_function(|| 2));
//! worker.join().unwrap();
//!
//! let t = engine.parse_template(&*text_factory(), "{{ one() + two() }}").unwrap();
//! assert_eq!(t.render(&serde_json::Value::Null).unwrap(), "3");
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use minijinja::Value;

use super::{
    Engine, Extensions, SharedFactoryTranslator, SharedNameTranslator, TemplateEngine,
};
use crate::error::Result;
use crate::factory::{ParseContext, SharedFactory, SharedTemplate, TemplateFactory};

/// An engine whose every operation is serialized behind one lock.
#[derive(Debug, Default)]
pub struct SyncEngine<E = Engine> {
    inner: Mutex<E>,
}

impl<E: TemplateEngine> SyncEngine<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    /// Unwraps the decorated engine.
    pub fn into_inner(self) -> E {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the engine while holding the lock once.
    ///
    /// Use this to apply a batch of registrations atomically.
    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, E> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_mut(&mut self) -> &mut E {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name_translator(&self) -> SharedNameTranslator {
        self.lock().name_translator()
    }

    pub fn set_name_translator(&self, translator: SharedNameTranslator) -> &Self {
        self.lock().set_name_translator(translator);
        self
    }

    pub fn factory_translator(&self) -> SharedFactoryTranslator {
        self.lock().factory_translator()
    }

    pub fn set_factory_translator(&self, translator: SharedFactoryTranslator) -> &Self {
        self.lock().set_factory_translator(translator);
        self
    }

    pub fn register_function(&self, name: &str, func: Value) -> &Self {
        self.lock().register_function(name, func);
        self
    }

    pub fn register_variable<V: Into<Value>>(&self, name: &str, value: V) -> &Self {
        self.lock().register_variable(name, value);
        self
    }

    pub fn parse_context(&self) -> ParseContext {
        self.lock().parse_context()
    }

    pub fn parse_template(
        &self,
        factory: &dyn TemplateFactory,
        text: &str,
    ) -> Result<SharedTemplate> {
        self.lock().parse_template(factory, text)
    }

    pub fn parse_named_template(
        &self,
        factory: &dyn TemplateFactory,
        name: &str,
        text: &str,
    ) -> Result<SharedTemplate> {
        self.lock().parse_named_template(factory, name, text)
    }

    pub fn add_template_extension<I>(&self, factory: SharedFactory, exts: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.lock().add_template_extension(factory, exts);
        self
    }

    pub fn add_template_search_path<I>(&self, paths: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        self.lock().add_template_search_path(paths);
        self
    }

    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.lock().search_paths()
    }

    pub fn extensions(&self) -> Extensions {
        self.lock().extensions()
    }

    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        self.lock().resolve(path)
    }

    pub fn load_template<P: AsRef<Path>>(
        &self,
        factory: Option<SharedFactory>,
        path: P,
    ) -> Result<SharedTemplate> {
        self.lock().load_template(factory, path)
    }
}

impl<E: TemplateEngine> TemplateEngine for SyncEngine<E> {
    fn name_translator(&self) -> SharedNameTranslator {
        self.lock().name_translator()
    }

    fn set_name_translator(&mut self, translator: SharedNameTranslator) -> &mut Self {
        self.get_mut().set_name_translator(translator);
        self
    }

    fn factory_translator(&self) -> SharedFactoryTranslator {
        self.lock().factory_translator()
    }

    fn set_factory_translator(&mut self, translator: SharedFactoryTranslator) -> &mut Self {
        self.get_mut().set_factory_translator(translator);
        self
    }

    fn register_function(&mut self, name: &str, func: Value) -> &mut Self {
        self.get_mut().register_function(name, func);
        self
    }

    fn parse_context(&self) -> ParseContext {
        self.lock().parse_context()
    }

    fn add_template_extension<I>(&mut self, factory: SharedFactory, exts: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.get_mut().add_template_extension(factory, exts);
        self
    }

    fn add_template_search_path<I>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        self.get_mut().add_template_search_path(paths);
        self
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        self.lock().search_paths()
    }

    fn extensions(&self) -> Extensions {
        self.lock().extensions()
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        self.lock().resolve(path)
    }

    fn load_template<P: AsRef<Path>>(
        &self,
        factory: Option<SharedFactory>,
        path: P,
    ) -> Result<SharedTemplate> {
        self.lock().load_template(factory, path)
    }
}

impl<E: TemplateEngine> From<E> for SyncEngine<E> {
    fn from(engine: E) -> Self {
        Self::new(engine)
    }
}
