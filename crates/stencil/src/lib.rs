//! # Stencil - Named Templates over Text and HTML Backends
//!
//! `stencil` puts a plain-text renderer and an HTML-escaping renderer behind
//! one abstraction and turns named templates into discoverable resources:
//! files are located through ordered search paths, dispatched to a backend by
//! extension, named from their path, and cached so each is parsed once.
//!
//! ## Core Concepts
//!
//! - [`Template`]: rendered-output contract, to a string or any writer
//! - [`TemplateFactory`]: per-backend parser with a name cache
//!   ([`text_factory`], [`html_factory`])
//! - [`Engine`]: function registry, extension map, search paths and path
//!   translators; resolves and loads templates
//! - [`SyncEngine`]: the same operations behind a single lock
//! - [`global_engine`]: a lazily built, pre-configured process-wide engine
//!
//! ## Quick Start
//!
//! ```rust
//! use minijinja::Value;
//! use serde_json::json;
//! use stencil::{html_factory, text_factory, Engine, TemplateEngine};
//!
//! let mut engine = Engine::new();
//! engine
//!     .register_function("shout", Value::from_function(|s: String| s.to_uppercase()))
//!     .register_variable("SITE", "example.org");
//!
//! let text = engine
//!     .parse_template(&*text_factory(), "{{ shout(name) }} @ {{ SITE }}")
//!     .unwrap();
//! assert_eq!(text.render(&json!({"name": "ada"})).unwrap(), "ADA @ example.org");
//!
//! let html = engine
//!     .parse_template(&*html_factory(), "<b>{{ name }}</b>")
//!     .unwrap();
//! assert_eq!(html.render(&json!({"name": "<i>"})).unwrap(), "<b>&lt;i&gt;</b>");
//! ```
//!
//! ## File-Based Templates
//!
//! ```rust,ignore
//! let mut engine = Engine::new();
//! engine
//!     .add_template_search_path(["/etc/myapp/templates", "./templates"])
//!     .add_template_extension(text_factory(), [".tmpl"])
//!     .add_template_extension(html_factory(), [".htmpl"]);
//!
//! // First hit of ./templates/report.htmpl, named "report", parsed as HTML.
//! let report = engine.load_template(None, "report")?;
//! ```
//!
//! See [`engine`] for the exact resolution order.

pub mod defaults;
pub mod engine;
mod error;
pub mod factory;
mod global;
pub mod template;

pub use error::{Result, TemplateError};

pub use engine::{
    Engine, ExtensionLookup, Extensions, FactoryTranslator, Filesystem, NameTranslator,
    OsFilesystem, SharedFactoryTranslator, SharedNameTranslator, StripExtension, SyncEngine,
    TemplateEngine,
};

pub use factory::{
    html_factory, text_factory, Escape, MiniJinjaFactory, MiniJinjaTemplate, ParseContext,
    SharedFactory, SharedTemplate, TemplateFactory,
};

pub use template::{render_to_string, LiteralTemplate, Template, TemplateExt};

pub use global::{
    add_template_extension, add_template_search_path, global_engine, load_template,
    parse_html_template, parse_named_html_template, parse_named_template,
    parse_named_text_template, parse_template, parse_text_template, register_function,
    register_variable,
};
