use crate::error::CompileError;
use crate::filter::{Escape, Filter};
use serde_json::Value;
use vellum_expr::{Expression, Helper};
use vellum_template_core::CodeUnitBuilder;

pub const FORMAT_FILE_SIZE: Helper = Helper::new("format_file_size", &["bytes"], format_file_size);

/// `filesize`: renders a byte count as KB, MB or GB with two decimals.
///
/// The output is plain text with no markup-significant characters, so the
/// filter turns escaping off.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSizeFilter;

impl Filter for FileSizeFilter {
    fn name(&self) -> &str {
        "filesize"
    }

    fn apply(
        &self,
        expression: Expression,
        _arguments: &[String],
        escape: &mut Escape,
        unit: &mut CodeUnitBuilder,
    ) -> Result<Expression, CompileError> {
        unit.register_helper(FORMAT_FILE_SIZE);
        escape.disable();
        Ok(expression.wrap(FORMAT_FILE_SIZE.name, Vec::new()))
    }
}

/// Divides by 1024 until the value drops below 1024, stopping at GB.
/// The smallest unit is KB, so 500 bytes is `0.49 KB`.
pub fn format_file_size(args: &[Value]) -> Result<Value, String> {
    let bytes = match args.first() {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("expected a byte count, got {}", describe(args.first())))?;

    let mut size = bytes / 1024.0;
    if size < 1024.0 {
        return Ok(Value::String(format!("{:.2} KB", size)));
    }
    size /= 1024.0;
    if size < 1024.0 {
        return Ok(Value::String(format!("{:.2} MB", size)));
    }
    size /= 1024.0;
    Ok(Value::String(format!("{:.2} GB", size)))
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "nothing".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn size(v: Value) -> String {
        match format_file_size(&[v]).unwrap() {
            Value::String(s) => s,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn picks_the_unit_by_successive_division() {
        assert_eq!(size(json!(500)), "0.49 KB");
        assert_eq!(size(json!(1536)), "1.50 KB");
        assert_eq!(size(json!(2097152)), "2.00 MB");
        assert_eq!(size(json!(5u64 * 1024 * 1024 * 1024)), "5.00 GB");
    }

    #[test]
    fn gigabytes_are_unbounded() {
        assert_eq!(size(json!(2048u64 * 1024 * 1024 * 1024)), "2048.00 GB");
    }

    #[test]
    fn accepts_numeric_strings() {
        assert_eq!(size(json!("1048576")), "1.00 MB");
    }

    #[test]
    fn rejects_non_numbers() {
        assert!(format_file_size(&[json!("big")]).is_err());
        assert!(format_file_size(&[json!(null)]).is_err());
        assert!(format_file_size(&[]).is_err());
    }

    #[test]
    fn filter_disables_escape_and_registers_helper() {
        let mut unit = CodeUnitBuilder::new();
        let mut escape = Escape::default();
        let expr = FileSizeFilter
            .apply(Expression::Path(vellum_expr::Path::variable("size")), &[], &mut escape, &mut unit)
            .unwrap();
        assert_eq!(expr.to_string(), "format_file_size(size)");
        assert!(!escape.is_enabled());
        assert!(unit.has_helper("format_file_size"));
    }
}
