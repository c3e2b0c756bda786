//! minijinja-backed template factories.
//!
//! [`MiniJinjaFactory`] owns a namespace of template sources: every template
//! parsed under a name is added to it and can be referenced from any template
//! of the same factory (`{% include "header" %}`, `{% extends "base" %}`).
//! The two process-wide factories, [`text_factory`] and [`html_factory`],
//! differ only in [`Escape`].
//!
//! # Function snapshots
//!
//! The functions of a [`ParseContext`] are installed as globals on an
//! environment private to each template. Nothing registered afterwards
//! reaches it.
//!
//! # Name resolution
//!
//! Included and extended templates are looked up in the namespace when the
//! template renders, not when it is parsed. A page can be parsed before its
//! partials, and re-parsing a partial reaches every page that includes it.
//! Each template keeps its own compiled body; its environment is rebuilt only
//! after the namespace changed.
//!
//! # Example
//!
//! ```rust
//! use stencil::factory::{MiniJinjaFactory, ParseContext, TemplateFactory};
//! use serde_json::json;
//!
//! let factory = MiniJinjaFactory::html();
//! let ctx = ParseContext::default();
//! let page = factory
//!     .parse_with_name(&ctx, "page", "{% include \"greeting\" %}!")
//!     .unwrap();
//! factory
//!     .parse_with_name(&ctx, "greeting", "<p>{{ who }}</p>")
//!     .unwrap();
//! assert_eq!(page.render(&json!({"who": "<b>"})).unwrap(), "<p>&lt;b&gt;</p>!");
//! assert!(factory.lookup("greeting").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use minijinja::{AutoEscape, Environment};
use once_cell::sync::Lazy;
use tracing::debug;

use super::{ParseContext, SharedFactory, SharedTemplate, TemplateFactory};
use crate::error::{Result, TemplateError};
use crate::template::Template;

/// Internal name for templates parsed without a name.
const ANONYMOUS: &str = "<anonymous>";

/// Output escaping applied by a factory's backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Interpolated values are written verbatim.
    None,
    /// Interpolated values are HTML-escaped.
    Html,
}

impl Escape {
    fn auto_escape(self) -> AutoEscape {
        match self {
            Escape::None => AutoEscape::None,
            Escape::Html => AutoEscape::Html,
        }
    }
}

/// Sources bound by name, shared by a factory and all of its templates.
///
/// `generation` increases on every named parse.
#[derive(Default)]
struct Namespace {
    sources: HashMap<String, Arc<str>>,
    generation: u64,
}

type SharedNamespace = Arc<RwLock<Namespace>>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A [`TemplateFactory`] over minijinja.
///
/// The factory is `Send + Sync`; parses take a short write lock on the
/// namespace and cache, lookups a read lock. Rendering only reads the
/// namespace when resolving an include.
pub struct MiniJinjaFactory {
    escape: Escape,
    namespace: SharedNamespace,
    cache: RwLock<HashMap<String, SharedTemplate>>,
}

impl MiniJinjaFactory {
    /// Creates a factory with its own, empty namespace.
    pub fn new(escape: Escape) -> Self {
        Self {
            escape,
            namespace: SharedNamespace::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A factory that performs no output escaping.
    pub fn text() -> Self {
        Self::new(Escape::None)
    }

    /// A factory that HTML-escapes interpolated values.
    pub fn html() -> Self {
        Self::new(Escape::Html)
    }

    pub fn escape(&self) -> Escape {
        self.escape
    }

    /// Names currently bound in this factory's namespace, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.cache).keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MiniJinjaFactory {
    fn default() -> Self {
        Self::text()
    }
}

impl fmt::Debug for MiniJinjaFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiniJinjaFactory")
            .field("escape", &self.escape)
            .field("names", &self.names())
            .finish()
    }
}

impl TemplateFactory for MiniJinjaFactory {
    fn parse_with_name(
        &self,
        ctx: &ParseContext,
        name: &str,
        text: &str,
    ) -> Result<SharedTemplate> {
        let bound = if name.is_empty() { ANONYMOUS } else { name };
        let source: Arc<str> = Arc::from(text);
        // Compiled before any lock is taken; a syntax error leaves the
        // namespace as it was.
        let env = build_environment(self.escape, ctx, &self.namespace, bound, &source)
            .map_err(|err| TemplateError::parse(name, err))?;

        if name.is_empty() {
            let generation = read(&self.namespace).generation;
            debug!(escape = ?self.escape, "parsed anonymous template");
            return Ok(Arc::new(MiniJinjaTemplate::new(
                self, ctx, bound, source, env, generation,
            )));
        }

        let mut ns = write(&self.namespace);
        ns.sources.insert(name.to_string(), Arc::clone(&source));
        ns.generation += 1;
        let template: SharedTemplate = Arc::new(MiniJinjaTemplate::new(
            self,
            ctx,
            bound,
            source,
            env,
            ns.generation,
        ));

        if write(&self.cache)
            .insert(name.to_string(), Arc::clone(&template))
            .is_some()
        {
            debug!(name, escape = ?self.escape, "replaced named template");
        } else {
            debug!(name, escape = ?self.escape, "parsed named template");
        }
        Ok(template)
    }

    fn lookup(&self, name: &str) -> Option<SharedTemplate> {
        read(&self.cache).get(name).cloned()
    }
}

/// Builds the environment a template renders in: the factory's escaping,
/// the context's functions, the template's own body, and a loader over the
/// shared namespace for everything it includes.
fn build_environment(
    escape: Escape,
    ctx: &ParseContext,
    namespace: &SharedNamespace,
    name: &str,
    source: &Arc<str>,
) -> std::result::Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(move |_name| escape.auto_escape());
    for (func_name, func) in ctx.funcs() {
        env.add_global(func_name.clone(), func.clone());
    }

    let shared = Arc::clone(namespace);
    env.set_loader(move |name| Ok(read(&shared).sources.get(name).map(|s| s.to_string())));

    env.add_template_owned(name.to_string(), source.to_string())?;
    Ok(env)
}

struct Compiled {
    generation: u64,
    env: Arc<Environment<'static>>,
}

/// A template compiled by a [`MiniJinjaFactory`].
///
/// Holds its own source and the functions visible at parse time. Other
/// templates it references are resolved through the factory namespace.
pub struct MiniJinjaTemplate {
    name: String,
    source: Arc<str>,
    escape: Escape,
    ctx: ParseContext,
    namespace: SharedNamespace,
    compiled: RwLock<Compiled>,
}

impl MiniJinjaTemplate {
    fn new(
        factory: &MiniJinjaFactory,
        ctx: &ParseContext,
        name: &str,
        source: Arc<str>,
        env: Environment<'static>,
        generation: u64,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            escape: factory.escape,
            ctx: ctx.clone(),
            namespace: Arc::clone(&factory.namespace),
            compiled: RwLock::new(Compiled {
                generation,
                env: Arc::new(env),
            }),
        }
    }

    /// The name this template was parsed under (`<anonymous>` when unnamed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment for the current namespace, rebuilt if the namespace
    /// changed since it was last compiled.
    fn environment(&self) -> Result<Arc<Environment<'static>>> {
        let generation = read(&self.namespace).generation;
        {
            let compiled = read(&self.compiled);
            if compiled.generation == generation {
                return Ok(Arc::clone(&compiled.env));
            }
        }

        let env = Arc::new(build_environment(
            self.escape,
            &self.ctx,
            &self.namespace,
            &self.name,
            &self.source,
        )?);
        *write(&self.compiled) = Compiled {
            generation,
            env: Arc::clone(&env),
        };
        debug!(name = %self.name, generation, "recompiled template for updated namespace");
        Ok(env)
    }
}

impl fmt::Debug for MiniJinjaTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiniJinjaTemplate")
            .field("name", &self.name)
            .field("escape", &self.escape)
            .finish()
    }
}

impl Template for MiniJinjaTemplate {
    fn render_to(&self, w: &mut dyn io::Write, data: &serde_json::Value) -> Result<()> {
        let env = self.environment()?;
        let tmpl = env.get_template(&self.name)?;
        tmpl.render_captured_to(data, w)?;
        Ok(())
    }
}

static TEXT_FACTORY: Lazy<SharedFactory> = Lazy::new(|| Arc::new(MiniJinjaFactory::text()));
static HTML_FACTORY: Lazy<SharedFactory> = Lazy::new(|| Arc::new(MiniJinjaFactory::html()));

/// The process-wide text factory.
pub fn text_factory() -> SharedFactory {
    Arc::clone(&TEXT_FACTORY)
}

/// The process-wide HTML-escaping factory.
pub fn html_factory() -> SharedFactory {
    Arc::clone(&HTML_FACTORY)
}
