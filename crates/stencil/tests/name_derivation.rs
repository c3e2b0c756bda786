//! Property tests for default template name derivation.

use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;
use stencil::{Extensions, MiniJinjaFactory, NameTranslator, StripExtension};

fn extensions(exts: &[&str]) -> Extensions {
    let mut map = Extensions::new();
    for ext in exts {
        map.insert(*ext, Arc::new(MiniJinjaFactory::text()));
    }
    map
}

proptest! {
    #[test]
    fn known_suffix_is_stripped_once(
        stem in "[a-z]{1,8}(\\.[a-z]{1,4}){0,2}",
        dir in "[a-z]{1,6}"
    ) {
        let exts = extensions(&[".tmpl"]);
        let path = PathBuf::from("/").join(dir).join(format!("{stem}.tmpl"));
        prop_assert_eq!(StripExtension.name_for_path(&path, &exts), stem);
    }

    #[test]
    fn doubled_suffix_keeps_inner_copy(stem in "[a-z]{1,8}") {
        let exts = extensions(&[".tmpl"]);
        let path = PathBuf::from(format!("{stem}.tmpl.tmpl"));
        prop_assert_eq!(StripExtension.name_for_path(&path, &exts), format!("{stem}.tmpl"));
    }

    #[test]
    fn unknown_suffix_keeps_base_name(stem in "[a-z]{1,8}", ext in "[a-z]{1,4}") {
        prop_assume!(ext != "tmpl" && ext != "htmpl");
        let exts = extensions(&[".tmpl", ".htmpl"]);
        let base = format!("{stem}.{ext}");
        let path = PathBuf::from("/srv").join(&base);
        prop_assert_eq!(StripExtension.name_for_path(&path, &exts), base);
    }
}
