//! Core abstractions for template compilation and execution
//!
//! This crate defines the contract between the vellum template compiler and
//! the runtime that executes its output.
//!
//! ## Key Abstractions
//!
//! - **`CodeUnitBuilder`**: collects helper routines while a node tree emits itself
//! - **`CodeUnit`**: the finalized, immutable artifact (helpers + render body)
//! - **`Instruction`**: one statement of the generated render body
//! - **`Location`**: a source position attached to diagnostics
//! - **`EscapeMode`**: the output escaping transform applied by the runtime

mod instruction;
mod location;
mod unit;

pub mod error;
pub mod escape;

pub use error::CodeUnitError;
pub use escape::{EscapeMode, escape_html};
pub use instruction::Instruction;
pub use location::Location;
pub use unit::{CodeUnit, CodeUnitBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use vellum_expr::{Expression, Helper, parse_expression};

    fn identity(args: &[Value]) -> Result<Value, String> {
        Ok(args.first().cloned().unwrap_or(Value::Null))
    }

    const IDENTITY: Helper = Helper::new("identity", &["value"], identity);

    fn output(src: &str) -> Instruction {
        Instruction::Output {
            expression: parse_expression(src).unwrap(),
            escape: true,
        }
    }

    #[test]
    fn finish_rejects_calls_to_unregistered_helpers() {
        let builder = CodeUnitBuilder::new();
        let err = builder.finish(vec![output("identity(x)")]).unwrap_err();
        assert_eq!(err, CodeUnitError::UndefinedHelper { name: "identity".into() });
    }

    #[test]
    fn finish_checks_nested_bodies() {
        let mut builder = CodeUnitBuilder::new();
        builder.register_helper(IDENTITY);
        let body = vec![Instruction::Branch {
            test: parse_expression("flag").unwrap(),
            then: vec![output("identity(x)")],
            otherwise: vec![Instruction::Iterate {
                binding: "item".into(),
                source: parse_expression("items").unwrap(),
                body: vec![output("missing(item)")],
                empty: vec![],
            }],
        }];
        let err = builder.finish(body).unwrap_err();
        assert_eq!(err, CodeUnitError::UndefinedHelper { name: "missing".into() });
    }

    #[test]
    fn repeated_registration_keeps_one_definition() {
        let mut builder = CodeUnitBuilder::named("report");
        assert!(builder.register_helper(IDENTITY));
        assert!(!builder.register_helper(IDENTITY));
        assert!(!builder.register_helper(IDENTITY));

        let unit = builder
            .finish(vec![output("identity(a)"), output("identity(b)")])
            .unwrap();
        assert_eq!(unit.helpers().len(), 1);
        assert_eq!(unit.to_string().matches("helper identity").count(), 1);
    }

    #[test]
    fn listing_shows_helpers_then_body() {
        let mut builder = CodeUnitBuilder::named("greeting");
        builder.register_helper(IDENTITY);
        let unit = builder
            .finish(vec![
                Instruction::Text("Hi ".into()),
                Instruction::Output {
                    expression: Expression::wrap(parse_expression("name").unwrap(), "identity", vec![]),
                    escape: false,
                },
                Instruction::Include { view: "footer".into(), locals: None },
            ])
            .unwrap();

        let expected = "// unit greeting\n\
                        helper identity(value)\n\
                        \n\
                        render {\n    \
                        text \"Hi \"\n    \
                        output identity(name)\n    \
                        include \"footer\"\n\
                        }\n";
        assert_eq!(unit.to_string(), expected);
    }
}
