//! Conventional configuration and the startup environment.
//!
//! [`Engine::with_defaults`] builds the configuration the process-wide engine
//! uses:
//!
//! | Setting | Value |
//! |---------|-------|
//! | Search paths | `<APP_FOLDER>/templates`, `<START_DIR>/templates`, `./templates` |
//! | Extensions | [`TEXT_EXTENSION`] → text factory, [`HTML_EXTENSION`] → HTML factory |
//! | Functions | `HOST_NAME()`, `SHELL()` |
//! | Variables | `START_DIR`, `APP_LOCATION`, `APP_FOLDER` |
//!
//! The start directory and executable location are captured once, the first
//! time any of them is needed, and stay fixed for the life of the process.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use minijinja::{Error, ErrorKind, Value};
use once_cell::sync::Lazy;
use tracing::warn;

use crate::engine::{Engine, TemplateEngine};
use crate::factory::{html_factory, text_factory};

/// Subfolder searched for templates under each conventional root.
pub const TEMPLATE_DIR: &str = "templates";

/// Extension bound to the text factory.
pub const TEXT_EXTENSION: &str = ".tmpl";

/// Extension bound to the HTML-escaping factory.
pub const HTML_EXTENSION: &str = ".htmpl";

/// Shell reported when `SHELL` is unset.
pub const FALLBACK_SHELL: &str = "/bin/sh";

pub const HOST_NAME: &str = "HOST_NAME";
pub const SHELL: &str = "SHELL";
pub const START_DIR: &str = "START_DIR";
pub const APP_LOCATION: &str = "APP_LOCATION";
pub const APP_FOLDER: &str = "APP_FOLDER";

struct Startup {
    start_dir: PathBuf,
    app_location: PathBuf,
    app_folder: PathBuf,
}

static STARTUP: Lazy<Startup> = Lazy::new(|| {
    let start_dir = env::current_dir().unwrap_or_else(|err| {
        warn!(%err, "could not determine the working directory");
        PathBuf::new()
    });
    let app_location = env::current_exe().unwrap_or_else(|err| {
        warn!(%err, "could not determine the executable path");
        PathBuf::new()
    });
    let app_folder = app_location
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Startup {
        start_dir,
        app_location,
        app_folder,
    }
});

/// The working directory when the startup environment was first read.
pub fn start_dir() -> &'static Path {
    &STARTUP.start_dir
}

/// The running executable.
pub fn app_location() -> &'static Path {
    &STARTUP.app_location
}

/// The directory containing the running executable.
pub fn app_folder() -> &'static Path {
    &STARTUP.app_folder
}

/// The user's shell from `SHELL`, or [`FALLBACK_SHELL`].
pub fn shell() -> String {
    match env::var(SHELL) {
        Ok(shell) if !shell.is_empty() => shell,
        _ => FALLBACK_SHELL.to_string(),
    }
}

/// The machine's host name.
pub fn hostname() -> io::Result<String> {
    let from_files = ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok());
    let from_env = ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| env::var(var).ok());

    if let Some(name) = from_files.chain(from_env).find_map(clean) {
        return Ok(name);
    }

    let output = Command::new("hostname").output()?;
    String::from_utf8(output.stdout)
        .ok()
        .and_then(clean)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host name is unavailable"))
}

fn clean(name: String) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// The conventional search paths, highest priority first.
pub fn default_search_paths() -> Vec<PathBuf> {
    vec![
        app_folder().join(TEMPLATE_DIR),
        start_dir().join(TEMPLATE_DIR),
        Path::new(".").join(TEMPLATE_DIR),
    ]
}

fn host_name_function() -> Result<String, Error> {
    hostname().map_err(|err| {
        Error::new(ErrorKind::InvalidOperation, "could not determine host name").with_source(err)
    })
}

impl Engine {
    /// An engine with the conventional search paths, extensions, functions
    /// and variables.
    pub fn with_defaults() -> Self {
        let mut engine = Engine::new();
        engine
            .add_template_search_path(default_search_paths())
            .add_template_extension(text_factory(), [TEXT_EXTENSION])
            .add_template_extension(html_factory(), [HTML_EXTENSION])
            .register_function(HOST_NAME, Value::from_function(host_name_function))
            .register_function(SHELL, Value::from_function(shell))
            .register_variable(START_DIR, start_dir().display().to_string())
            .register_variable(APP_LOCATION, app_location().display().to_string())
            .register_variable(APP_FOLDER, app_folder().display().to_string());
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::sync::Arc;

    #[test]
    fn test_default_search_path_order() {
        let paths = default_search_paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], app_folder().join("templates"));
        assert_eq!(paths[1], start_dir().join("templates"));
        assert_eq!(paths[2], PathBuf::from("./templates"));
    }

    #[test]
    fn test_app_folder_contains_app_location() {
        assert_eq!(app_location().parent(), Some(app_folder()));
    }

    #[test]
    fn test_with_defaults_binds_extensions() {
        let engine = Engine::with_defaults();
        let exts = engine.extensions();
        assert!(Arc::ptr_eq(exts.get(TEXT_EXTENSION).unwrap(), &text_factory()));
        assert!(Arc::ptr_eq(exts.get(HTML_EXTENSION).unwrap(), &html_factory()));
        assert_eq!(engine.search_paths(), default_search_paths());
    }

    #[test]
    fn test_with_defaults_registers_builtins() {
        let engine = Engine::with_defaults();
        let ctx = engine.parse_context();
        for name in [HOST_NAME, SHELL, START_DIR, APP_LOCATION, APP_FOLDER] {
            assert!(ctx.funcs().contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_variables_render() {
        let engine = Engine::with_defaults();
        let t = engine
            .parse_template(&*text_factory(), "{{ START_DIR }}|{{ APP_FOLDER }}")
            .unwrap();
        let expected = format!("{}|{}", start_dir().display(), app_folder().display());
        assert_eq!(t.render(&json!(null)).unwrap(), expected);
    }

    #[test]
    fn test_variables_compare_as_strings() {
        let engine = Engine::with_defaults();
        let source = concat!(
            "{% if APP_LOCATION == location %}same{% endif %}|",
            "{% if START_DIR|length == dir_len %}len{% endif %}",
        );
        let t = engine.parse_template(&*text_factory(), source).unwrap();
        let location = app_location().display().to_string();
        let dir_len = start_dir().display().to_string().chars().count();
        let out = t
            .render(&json!({"location": location, "dir_len": dir_len}))
            .unwrap();
        assert_eq!(out, "same|len");
    }

    #[test]
    #[serial]
    fn test_shell_uses_env() {
        let saved = env::var(SHELL).ok();

        env::set_var(SHELL, "/usr/bin/fish");
        assert_eq!(shell(), "/usr/bin/fish");

        env::remove_var(SHELL);
        assert_eq!(shell(), FALLBACK_SHELL);

        if let Some(saved) = saved {
            env::set_var(SHELL, saved);
        }
    }

    #[test]
    #[serial]
    fn test_shell_function_renders() {
        let saved = env::var(SHELL).ok();
        env::set_var(SHELL, "/bin/zsh");

        let engine = Engine::with_defaults();
        let t = engine.parse_template(&*text_factory(), "{{ SHELL() }}").unwrap();
        assert_eq!(t.render(&json!(null)).unwrap(), "/bin/zsh");

        match saved {
            Some(saved) => env::set_var(SHELL, saved),
            None => env::remove_var(SHELL),
        }
    }

    #[test]
    fn test_clean_trims_and_rejects_empty() {
        assert_eq!(clean("  box-01\n".to_string()), Some("box-01".to_string()));
        assert_eq!(clean(" \n".to_string()), None);
    }
}
