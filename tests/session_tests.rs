mod common;

use common::{TestResult, ViewFolder, locals};
use serde_json::{Value, json};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use vellum::{RenderError, ViewConfig, ViewEngine, ViewError};
use vellum_compiler::filters::HelperFilter;
use vellum_expr::Helper;

#[test]
fn session_variables_are_visible_to_nested_views() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("layout", "<title>{{ site }}</title>{% include 'parts/nav' %}")?
        .add("parts/nav", "<nav>{{ user.name | default:'guest' }}@{{ site }}</nav>")?;
    let engine = views.engine()?;

    let mut session = engine.session();
    session.set_var("site", json!("Docs"));
    session.set_vars([("user", json!({ "name": "ada" }))]);

    assert_eq!(
        session.load_view("layout", locals(json!({})))?,
        "<title>Docs</title><nav>ada@Docs</nav>"
    );
    Ok(())
}

#[test]
fn variables_set_in_nested_views_are_discarded() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("page", "{% include 'child' %}[{% if scratch %}leaked{% else %}clean{% endif %}]")?
        .add("child", "{% set scratch = 'tmp' %}{{ scratch }}")?;
    let engine = views.engine()?;

    let mut session = engine.session();
    session.set_var("scratch", json!(false));
    assert_eq!(session.load_view("page", locals(json!({})))?, "tmp[clean]");
    assert_eq!(session.get_var("scratch"), Some(&json!(false)));
    assert_eq!(session.context().depth(), 1);
    Ok(())
}

#[test]
fn top_level_set_persists_in_the_session() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("first", "{% set theme = 'dark' %}")?
        .add("second", "theme={{ theme }}")?;
    let engine = views.engine()?;

    let mut session = engine.session();
    session.load_view("first", locals(json!({})))?;
    assert!(session.has_var("theme"));
    assert_eq!(session.load_view("second", locals(json!({})))?, "theme=dark");
    Ok(())
}

#[test]
fn page_locals_never_enter_the_context_stack() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("list", "{% for item in items %}{% include 'row' with item %}{% endfor %}")?
        .add("row", "<li>{{ label }}</li>")?;
    let engine = views.engine()?;

    let mut session = engine.session();
    session.set_var("items", json!([{ "label": "one" }, { "label": "two" }]));
    let out = session.load_view("list", locals(json!({})))?;
    assert_eq!(out, "<li>one</li><li>two</li>");
    assert_eq!(session.get_var("label"), None);
    assert_eq!(session.get_var("item"), None);

    let out = session.load_view("row", locals(json!({ "label": "direct" })))?;
    assert_eq!(out, "<li>direct</li>");
    assert!(!session.has_var("label"));
    Ok(())
}

#[test]
fn failing_include_leaves_the_stack_balanced() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("page", "before {% include 'bad' %} after")?
        .add("bad", "{% set x = 1 %}{{ undefined_thing }}")?;
    let engine = views.engine()?;

    let mut session = engine.session();
    let err = session.load_view("page", locals(json!({}))).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Render(RenderError::NoSuchVariable(ref name)) if name == "undefined_thing"
    ));
    assert_eq!(session.context().depth(), 1);
    assert!(!session.has_var("x"));
    Ok(())
}

fn explode(_args: &[Value]) -> Result<Value, String> {
    panic!("helper exploded")
}

#[test]
fn panicking_include_leaves_the_session_usable() -> TestResult {
    let views = ViewFolder::new()?;
    views
        .add("page", "{% include 'child' %}")?
        .add("child", "{% set scratch = 1 %}{{ x | explode }}")?
        .add("plain", "{% set top = 'kept' %}{{ top }}")?;
    let engine = ViewEngine::builder()
        .with_config(views.config())
        .with_filter(Arc::new(HelperFilter::new(
            "explode",
            Helper::new("explode", &["value"], explode),
        )))?
        .build()?;

    let mut session = engine.session();
    session.set_var("x", json!(1));
    let result = catch_unwind(AssertUnwindSafe(|| session.load_view("page", locals(json!({})))));
    assert!(result.is_err());
    assert_eq!(session.context().depth(), 1);
    assert!(!session.has_var("scratch"));

    // Still treated as an outermost render, so `set` reaches the base frame.
    assert_eq!(session.load_view("plain", locals(json!({})))?, "kept");
    assert_eq!(session.get_var("top"), Some(&json!("kept")));
    Ok(())
}

#[test]
fn missing_include_is_reported() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("page", "{% include 'nowhere' %}")?;
    let engine = views.engine()?;
    let mut session = engine.session();
    assert!(matches!(
        session.load_view("page", locals(json!({}))),
        Err(ViewError::NoSuchView { ref name, .. }) if name == "nowhere"
    ));
    assert_eq!(session.context().depth(), 1);
    Ok(())
}

#[test]
fn include_recursion_is_bounded() -> TestResult {
    let views = ViewFolder::new()?;
    views.add("again", "x{% include 'again' %}")?;
    let engine = ViewEngine::new(ViewConfig {
        max_include_depth: 4,
        ..views.config()
    })?;
    let mut session = engine.session();
    assert!(matches!(
        session.load_view("again", locals(json!({}))),
        Err(ViewError::IncludeDepth { limit: 4, .. })
    ));
    assert_eq!(session.context().depth(), 1);
    Ok(())
}

#[test]
fn delete_var_is_idempotent() -> TestResult {
    let views = ViewFolder::new()?;
    let engine = views.engine()?;
    let mut session = engine.session();
    session.set_var("a", json!(1));
    assert_eq!(session.delete_var("a"), Some(json!(1)));
    assert_eq!(session.delete_var("a"), None);
    assert!(!session.has_var("a"));
    Ok(())
}

#[test]
fn url_helpers_follow_base_urls() -> TestResult {
    let views = ViewFolder::new()?;
    let engine = ViewEngine::new(ViewConfig {
        base_url: "https://example.com/app".into(),
        asset_base_url: "https://cdn.example.com/static/".into(),
        ..views.config()
    })?;
    let session = engine.session();

    assert_eq!(session.url(None), "https://example.com/app");
    assert_eq!(session.url(Some("users/7")), "https://example.com/app/users/7");
    assert_eq!(session.url(Some("/login")), "https://example.com/app/login");
    assert_eq!(session.asset_url(Some("css/site.css")), "https://cdn.example.com/static/css/site.css");
    assert_eq!(session.asset_url(Some("/favicon.ico")), "https://cdn.example.com/static/favicon.ico");
    Ok(())
}
