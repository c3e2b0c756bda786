//! The process-wide default engine.
//!
//! [`global_engine`] is built on first access from
//! [`Engine::with_defaults`](crate::Engine::with_defaults), wrapped in a
//! [`SyncEngine`], and lives for the rest of the process. The free functions
//! in this module all delegate to it.
//!
//! Code that needs isolation (tests especially) should build its own
//! [`Engine`](crate::Engine) instead of touching this one.
//!
//! ```rust
//! use serde_json::json;
//!
//! stencil::register_variable("APP", "inventory");
//! let t = stencil::parse_text_template("{{ APP }}: {{ count }} items").unwrap();
//! assert_eq!(t.render(&json!({"count": 3})).unwrap(), "inventory: 3 items");
//! ```

use std::path::{Path, PathBuf};

use minijinja::Value;
use once_cell::sync::Lazy;

use crate::engine::{Engine, SyncEngine};
use crate::error::Result;
use crate::factory::{html_factory, text_factory, SharedFactory, SharedTemplate, TemplateFactory};

static GLOBAL_ENGINE: Lazy<SyncEngine> = Lazy::new(|| SyncEngine::new(Engine::with_defaults()));

/// The process-wide engine.
pub fn global_engine() -> &'static SyncEngine {
    &GLOBAL_ENGINE
}

/// Registers a function on the global engine.
pub fn register_function(name: &str, func: Value) -> &'static SyncEngine {
    global_engine().register_function(name, func)
}

/// Registers a variable on the global engine.
pub fn register_variable<V: Into<Value>>(name: &str, value: V) -> &'static SyncEngine {
    global_engine().register_variable(name, value)
}

/// Parses anonymous text with `factory` and the global functions.
pub fn parse_template(factory: &dyn TemplateFactory, text: &str) -> Result<SharedTemplate> {
    global_engine().parse_template(factory, text)
}

/// Parses anonymous text with the text factory.
pub fn parse_text_template(text: &str) -> Result<SharedTemplate> {
    parse_template(&*text_factory(), text)
}

/// Parses anonymous text with the HTML-escaping factory.
pub fn parse_html_template(text: &str) -> Result<SharedTemplate> {
    parse_template(&*html_factory(), text)
}

/// Parses `text` under `name` with `factory` and the global functions.
pub fn parse_named_template(
    factory: &dyn TemplateFactory,
    name: &str,
    text: &str,
) -> Result<SharedTemplate> {
    global_engine().parse_named_template(factory, name, text)
}

/// Parses `text` under `name` with the text factory.
pub fn parse_named_text_template(name: &str, text: &str) -> Result<SharedTemplate> {
    parse_named_template(&*text_factory(), name, text)
}

/// Parses `text` under `name` with the HTML-escaping factory.
pub fn parse_named_html_template(name: &str, text: &str) -> Result<SharedTemplate> {
    parse_named_template(&*html_factory(), name, text)
}

/// Binds extensions to `factory` on the global engine.
pub fn add_template_extension<I>(factory: SharedFactory, exts: I) -> &'static SyncEngine
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    global_engine().add_template_extension(factory, exts)
}

/// Appends search paths to the global engine.
pub fn add_template_search_path<I>(paths: I) -> &'static SyncEngine
where
    I: IntoIterator,
    I::Item: Into<PathBuf>,
{
    global_engine().add_template_search_path(paths)
}

/// Loads a template through the global engine.
pub fn load_template<P: AsRef<Path>>(
    factory: Option<SharedFactory>,
    path: P,
) -> Result<SharedTemplate> {
    global_engine().load_template(factory, path)
}
