mod common;

use common::{TestResult, ViewFolder, locals};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use vellum::{ViewConfig, ViewEngine, ViewError};

fn touch(path: &std::path::Path, source: &str, modified: SystemTime) -> std::io::Result<()> {
    fs::write(path, source)?;
    fs::File::options().write(true).open(path)?.set_modified(modified)
}

#[test]
fn compiled_units_are_reused_until_the_file_changes() -> TestResult {
    let views = ViewFolder::new()?;
    let path = views.path().join("home.tpl");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    touch(&path, "v1 {{ n }}", t0)?;
    let engine = views.engine()?;

    let first = engine.compile_view("home")?;
    let second = engine.compile_view("home")?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().len(), 1);

    touch(&path, "v2 {{ n }}", t0 + Duration::from_secs(5))?;
    let third = engine.compile_view("home")?;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(engine.render("home", locals(json!({ "n": 1 })))?, "v2 1");
    Ok(())
}

#[test]
fn failed_compiles_are_not_cached() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("bad", "{% if x %}")?;
    let engine = views.engine()?;
    assert!(matches!(engine.compile_view("bad"), Err(ViewError::Compile { .. })));
    assert!(engine.cache().is_empty());
    Ok(())
}

#[test]
fn caching_can_be_disabled() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("home", "hi")?;
    let engine = ViewEngine::new(ViewConfig {
        cache_compiled: false,
        ..views.config()
    })?;
    let first = engine.compile_view("home")?;
    let second = engine.compile_view("home")?;
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(engine.cache().is_empty());
    Ok(())
}

#[test]
fn dump_listing_shows_generated_code() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("size", "Size: {{ size | filesize }}")?;
    let listing = views.engine()?.compile_view("size")?.to_string();
    assert_eq!(
        listing,
        "// unit size\n\
         helper format_file_size(bytes)\n\
         \n\
         render {\n    \
         text \"Size: \"\n    \
         output format_file_size(size)\n\
         }\n"
    );
    Ok(())
}

#[test]
fn engine_is_shareable_across_threads() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("greet", "Hello {{ who }}")?;
    let engine = Arc::new(views.engine()?);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.render("greet", locals(json!({ "who": i }))))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().map_err(|_| "render thread panicked")??;
        assert_eq!(out, format!("Hello {}", i));
    }
    Ok(())
}
