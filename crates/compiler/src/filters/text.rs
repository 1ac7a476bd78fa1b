//! Helper routines behind the string and collection filters.

use serde_json::Value;
use vellum_expr::{Helper, is_truthy, to_output_string};
use vellum_template_core::escape_html;

pub const STR_UPPER: Helper = Helper::new("str_upper", &["value"], str_upper);
pub const STR_LOWER: Helper = Helper::new("str_lower", &["value"], str_lower);
pub const STR_TRIM: Helper = Helper::new("str_trim", &["value"], str_trim);
pub const VALUE_OR_DEFAULT: Helper = Helper::new("value_or_default", &["value", "fallback"], value_or_default);
pub const STR_TRUNCATE: Helper = Helper::new("str_truncate", &["value", "length", "suffix"], str_truncate);
pub const VALUE_LENGTH: Helper = Helper::new("value_length", &["value"], value_length);
pub const ARRAY_JOIN: Helper = Helper::new("array_join", &["value", "separator"], array_join);
pub const JSON_ENCODE: Helper = Helper::new("json_encode", &["value"], json_encode);
pub const HTML_NL2BR: Helper = Helper::new("html_nl2br", &["value"], html_nl2br);

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Null)
}

fn text(args: &[Value]) -> String {
    to_output_string(arg(args, 0))
}

fn str_upper(args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(text(args).to_uppercase()))
}

fn str_lower(args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(text(args).to_lowercase()))
}

fn str_trim(args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(text(args).trim().to_string()))
}

/// Null, empty strings and other falsy values fall back. `0` and `false` are
/// kept, since they are meaningful output.
fn value_or_default(args: &[Value]) -> Result<Value, String> {
    let value = arg(args, 0);
    let keep = match value {
        Value::Number(_) | Value::Bool(_) => true,
        other => is_truthy(other),
    };
    Ok(if keep { value.clone() } else { arg(args, 1).clone() })
}

fn str_truncate(args: &[Value]) -> Result<Value, String> {
    let limit = match arg(args, 1) {
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
    .ok_or_else(|| format!("length must be a non-negative integer, got {}", arg(args, 1)))?;
    let suffix = match args.get(2) {
        Some(v) => to_output_string(v),
        None => "...".to_string(),
    };

    let value = text(args);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    if value.chars().count() <= limit {
        return Ok(Value::String(value));
    }
    let mut truncated: String = value.chars().take(limit).collect();
    truncated.push_str(&suffix);
    Ok(Value::String(truncated))
}

fn value_length(args: &[Value]) -> Result<Value, String> {
    let length = match arg(args, 0) {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::Null => 0,
        other => to_output_string(other).chars().count(),
    };
    Ok(Value::from(length))
}

fn array_join(args: &[Value]) -> Result<Value, String> {
    let separator = match args.get(1) {
        Some(v) => to_output_string(v),
        None => ", ".to_string(),
    };
    Ok(Value::String(match arg(args, 0) {
        Value::Array(items) => items
            .iter()
            .map(to_output_string)
            .collect::<Vec<_>>()
            .join(&separator),
        other => to_output_string(other),
    }))
}

fn json_encode(args: &[Value]) -> Result<Value, String> {
    serde_json::to_string(arg(args, 0))
        .map(Value::String)
        .map_err(|e| e.to_string())
}

/// Escapes its input itself, because the filter turns output escaping off.
fn html_nl2br(args: &[Value]) -> Result<Value, String> {
    let value = text(args);
    let escaped = escape_html(&value);
    Ok(Value::String(escaped.replace("\r\n", "\n").replace('\n', "<br />\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn case_and_trim() {
        assert_eq!(str_upper(&[json!("Mixed")]).unwrap(), json!("MIXED"));
        assert_eq!(str_lower(&[json!("Mixed")]).unwrap(), json!("mixed"));
        assert_eq!(str_trim(&[json!("  x \n")]).unwrap(), json!("x"));
        assert_eq!(str_upper(&[json!(null)]).unwrap(), json!(""));
    }

    #[test]
    fn default_keeps_zero_and_false() {
        assert_eq!(value_or_default(&[json!(null), json!("n/a")]).unwrap(), json!("n/a"));
        assert_eq!(value_or_default(&[json!(""), json!("n/a")]).unwrap(), json!("n/a"));
        assert_eq!(value_or_default(&[json!(0), json!("n/a")]).unwrap(), json!(0));
        assert_eq!(value_or_default(&[json!(false), json!("n/a")]).unwrap(), json!(false));
        assert_eq!(value_or_default(&[json!("x"), json!("n/a")]).unwrap(), json!("x"));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(str_truncate(&[json!("héllo world"), json!(5)]).unwrap(), json!("héllo..."));
        assert_eq!(str_truncate(&[json!("short"), json!(10)]).unwrap(), json!("short"));
        assert_eq!(str_truncate(&[json!("abcdef"), json!(3), json!("~")]).unwrap(), json!("abc~"));
        assert!(str_truncate(&[json!("abc"), json!(-1)]).is_err());
    }

    #[test]
    fn length_of_each_shape() {
        assert_eq!(value_length(&[json!([1, 2, 3])]).unwrap(), json!(3));
        assert_eq!(value_length(&[json!({"a": 1})]).unwrap(), json!(1));
        assert_eq!(value_length(&[json!("naïve")]).unwrap(), json!(5));
        assert_eq!(value_length(&[json!(null)]).unwrap(), json!(0));
    }

    #[test]
    fn join_and_json() {
        assert_eq!(array_join(&[json!(["a", 1, true])]).unwrap(), json!("a, 1, true"));
        assert_eq!(array_join(&[json!(["a", "b"]), json!("/")]).unwrap(), json!("a/b"));
        assert_eq!(json_encode(&[json!({"k": [1]})]).unwrap(), json!(r#"{"k":[1]}"#));
    }

    #[test]
    fn nl2br_escapes_before_inserting_breaks() {
        assert_eq!(
            html_nl2br(&[json!("<b>\nline")]).unwrap(),
            json!("&lt;b&gt;<br />\nline")
        );
    }
}
