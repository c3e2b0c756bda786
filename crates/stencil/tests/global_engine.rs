//! The process-wide engine and its convenience functions.
//!
//! These tests share one engine, so they run serially and use names unique to
//! each test.

use minijinja::Value;
use serde_json::json;
use serial_test::serial;
use stencil::defaults::{HTML_EXTENSION, TEXT_EXTENSION};
use stencil::{html_factory, text_factory, TemplateExt};
use tempfile::TempDir;

#[test]
#[serial]
fn global_engine_has_conventional_configuration() {
    let engine = stencil::global_engine();
    let exts = engine.extensions();
    assert!(exts.contains(TEXT_EXTENSION));
    assert!(exts.contains(HTML_EXTENSION));

    let paths = engine.search_paths();
    assert!(paths.len() >= 3);
    assert_eq!(&paths[..3], stencil::defaults::default_search_paths().as_slice());
}

#[test]
#[serial]
fn global_builtins_are_available() {
    let source = concat!(
        "{% if SHELL() != '' %}shell{% endif %} ",
        "{% if APP_LOCATION != '' %}location{% endif %}",
    );
    let t = stencil::parse_text_template(source).unwrap();
    assert_eq!(t.render(&json!(null)).unwrap(), "shell location");
}

#[test]
#[serial]
fn global_registration_reaches_later_parses() {
    stencil::register_function("global_test_double", Value::from_function(|n: i64| n * 2));
    stencil::register_variable("GLOBAL_TEST_NAME", "stencil");

    let t = stencil::parse_text_template("{{ global_test_double(4) }} {{ GLOBAL_TEST_NAME }}")
        .unwrap();
    assert_eq!(t.render(&json!(null)).unwrap(), "8 stencil");
}

#[test]
#[serial]
fn global_named_parses_land_in_process_factories() {
    stencil::parse_named_text_template("global_test_text", "text {{ v }}").unwrap();
    stencil::parse_named_html_template("global_test_html", "html {{ v }}").unwrap();

    let data = json!({"v": "<&>"});
    let text = text_factory().lookup("global_test_text").unwrap();
    let html = html_factory().lookup("global_test_html").unwrap();
    assert_eq!(text.render(&data).unwrap(), "text <&>");
    assert_eq!(html.render(&data).unwrap(), "html &lt;&amp;&gt;");
}

#[test]
#[serial]
fn global_html_parse_escapes() {
    let t = stencil::parse_html_template("<a href=\"{{ url }}\">x</a>").unwrap();
    let out = t.render(&json!({"url": "\"><script>"})).unwrap();
    assert!(!out.contains("<script>"));
}

#[test]
#[serial]
fn global_load_from_added_search_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("global_test_report.htmpl"), "<h1>{{ title }}</h1>").unwrap();

    stencil::add_template_search_path([dir.path()]);
    let t = stencil::load_template(None, "global_test_report").unwrap();

    #[derive(serde::Serialize)]
    struct Report {
        title: &'static str,
    }
    assert_eq!(
        t.render_serialize(&Report { title: "Q&A" }).unwrap(),
        "<h1>Q&amp;A</h1>"
    );
    assert!(html_factory().lookup("global_test_report").is_some());
}

#[test]
#[serial]
fn global_custom_extension() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("global_test_custom.page"), "custom {{ n }}").unwrap();

    stencil::add_template_extension(text_factory(), [".page"]);
    stencil::add_template_search_path([dir.path()]);
    let t = stencil::load_template(None, "global_test_custom").unwrap();
    assert_eq!(t.render(&json!({"n": 1})).unwrap(), "custom 1");
}

#[test]
#[serial]
fn global_parse_with_explicit_factory() {
    let t = stencil::parse_template(&*html_factory(), "{{ s }}").unwrap();
    assert_eq!(t.render(&json!({"s": "<"})).unwrap(), "&lt;");
    let named = stencil::parse_named_template(&*text_factory(), "global_test_explicit", "{{ s }}")
        .unwrap();
    assert_eq!(named.render(&json!({"s": "<"})).unwrap(), "<");
}
