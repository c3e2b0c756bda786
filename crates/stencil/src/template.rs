//! The rendered-output contract.
//!
//! A [`Template`] is immutable once built. It renders either into any
//! [`io::Write`] sink via [`render_to`](Template::render_to), or into a
//! `String` via [`render`](Template::render), which is defined once in terms of
//! `render_to` and shared by every implementation.
//!
//! ```rust
//! use stencil::{LiteralTemplate, Template};
//!
//! let banner = LiteralTemplate::new("== report ==");
//! assert_eq!(banner.render(&serde_json::Value::Null).unwrap(), "== report ==");
//! ```

use std::borrow::Cow;
use std::io;

use serde::Serialize;

use crate::error::Result;

/// A compiled template that can be executed against data.
///
/// Rendering never changes backend state, so a template may be rendered from
/// many threads at once.
pub trait Template: Send + Sync + std::fmt::Debug {
    /// Renders into `w`.
    fn render_to(&self, w: &mut dyn io::Write, data: &serde_json::Value) -> Result<()>;

    /// Renders into a freshly allocated string.
    fn render(&self, data: &serde_json::Value) -> Result<String> {
        render_to_string(self, data)
    }
}

/// Renders `template` into an in-memory buffer and returns its contents.
///
/// This is the shared implementation behind [`Template::render`].
pub fn render_to_string<T: Template + ?Sized>(
    template: &T,
    data: &serde_json::Value,
) -> Result<String> {
    let mut buf = Vec::new();
    template.render_to(&mut buf, data)?;
    Ok(String::from_utf8(buf)?)
}

/// Convenience methods for rendering any [`Serialize`] value.
pub trait TemplateExt: Template {
    /// Serializes `data` and renders it to a string.
    fn render_serialize<S: Serialize + ?Sized>(&self, data: &S) -> Result<String> {
        let value = serde_json::to_value(data)
            .map_err(|err| crate::TemplateError::Render(err.to_string()))?;
        self.render(&value)
    }
}

impl<T: Template + ?Sized> TemplateExt for T {}

/// A template whose output is a fixed string, regardless of data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralTemplate(Cow<'static, str>);

impl LiteralTemplate {
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Template for LiteralTemplate {
    fn render_to(&self, w: &mut dyn io::Write, _data: &serde_json::Value) -> Result<()> {
        w.write_all(self.0.as_bytes())?;
        Ok(())
    }

    fn render(&self, _data: &serde_json::Value) -> Result<String> {
        Ok(self.0.to_string())
    }
}
