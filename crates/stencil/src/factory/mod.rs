//! Per-backend parsers with a name cache.
//!
//! A [`TemplateFactory`] turns source text into a [`Template`](crate::Template),
//! optionally binding it to a name inside the backend's namespace so that it
//! can later be fetched with [`lookup`](TemplateFactory::lookup) without being
//! parsed again.
//!
//! Two factories ship with the crate, both backed by minijinja and differing
//! only in output escaping:
//!
//! | Factory | Escaping |
//! |---------|----------|
//! | [`text_factory`] | none |
//! | [`html_factory`] | HTML, on every interpolated value |
//!
//! Any backend can be plugged in by implementing the trait.

pub mod backend;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::template::Template;

pub use self::backend::{html_factory, text_factory, Escape, MiniJinjaFactory, MiniJinjaTemplate};

/// A template shared between a factory cache and its callers.
pub type SharedTemplate = Arc<dyn Template>;

/// A factory shared between engines and extension maps.
pub type SharedFactory = Arc<dyn TemplateFactory>;

/// Parser and name cache for one template backend.
pub trait TemplateFactory: Send + Sync + std::fmt::Debug {
    /// Parses anonymous text. Equivalent to `parse_with_name(ctx, "", text)`.
    fn parse(&self, ctx: &ParseContext, text: &str) -> Result<SharedTemplate> {
        self.parse_with_name(ctx, "", text)
    }

    /// Parses `text`, binding it to `name` in the backend namespace with the
    /// context's functions available to the template body.
    ///
    /// A failed parse leaves the namespace and cache untouched.
    fn parse_with_name(
        &self,
        ctx: &ParseContext,
        name: &str,
        text: &str,
    ) -> Result<SharedTemplate>;

    /// Returns the template previously parsed under `name`, if any.
    fn lookup(&self, name: &str) -> Option<SharedTemplate>;
}

/// Functions and variables made available to a parse.
///
/// A context is a snapshot: it is taken from the engine's registry at the
/// moment of the call and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    funcs: BTreeMap<String, minijinja::Value>,
}

impl ParseContext {
    pub fn new(funcs: BTreeMap<String, minijinja::Value>) -> Self {
        Self { funcs }
    }

    /// Registered functions by name.
    pub fn funcs(&self) -> &BTreeMap<String, minijinja::Value> {
        &self.funcs
    }
}

impl FromIterator<(String, minijinja::Value)> for ParseContext {
    fn from_iter<I: IntoIterator<Item = (String, minijinja::Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
