//! Expression evaluation against a layered scope

pub mod functions;
pub mod iter;
pub mod scope;
pub mod value;

pub use functions::{Function, Functions};
pub use iter::{iterate, Pairs};
pub use scope::Scope;

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::config::UndefinedBehavior;
use crate::error::RenderError;
use crate::expr::{BinaryOp, Expr, Literal, UnaryOp};
use value::{as_number, is_truthy, kind, number, to_text, values_equal};

/// Walks an [`Expr`] tree and produces a value
pub struct Evaluator<'e> {
    functions: &'e Functions,
    undefined: UndefinedBehavior,
}

impl<'e> Evaluator<'e> {
    pub fn new(functions: &'e Functions, undefined: UndefinedBehavior) -> Self {
        Self {
            functions,
            undefined,
        }
    }

    pub fn eval(&self, expr: &Expr, scope: &Scope<'_>) -> Result<Value, RenderError> {
        match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::Ident(name) => match scope.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => match self.undefined {
                    UndefinedBehavior::Strict => Err(RenderError::UndefinedVariable {
                        name: name.clone(),
                    }),
                    UndefinedBehavior::Lenient => Ok(Value::Null),
                },
            },
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item, scope))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval(value, scope)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Member { object, property } => member(&self.eval(object, scope)?, property),
            Expr::Index { object, index } => {
                let object = self.eval(object, scope)?;
                let index = self.eval(index, scope)?;
                self::index(&object, &index)
            }
            Expr::Call { function, args } => {
                let args = self.eval_all(args, scope)?;
                self.call(function, &args)
            }
            Expr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let mut all = Vec::with_capacity(args.len() + 1);
                all.push(self.eval(receiver, scope)?);
                all.extend(self.eval_all(args, scope)?);
                self.call(method, &all)
            }
            Expr::Unary { op, operand } => unary(*op, self.eval(operand, scope)?),
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, scope),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if is_truthy(&self.eval(cond, scope)?) {
                    self.eval(then, scope)
                } else {
                    self.eval(otherwise, scope)
                }
            }
        }
    }

    fn eval_all(&self, exprs: &[Expr], scope: &Scope<'_>) -> Result<Vec<Value>, RenderError> {
        exprs.iter().map(|e| self.eval(e, scope)).collect()
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, RenderError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| RenderError::UnknownFunction {
                name: name.to_string(),
            })?;
        function(args).map_err(|message| RenderError::Function {
            name: name.to_string(),
            message,
        })
    }

    fn binary(
        &self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        scope: &Scope<'_>,
    ) -> Result<Value, RenderError> {
        // Connectives short-circuit and yield the deciding operand
        match op {
            BinaryOp::And => {
                let left = self.eval(lhs, scope)?;
                return if is_truthy(&left) {
                    self.eval(rhs, scope)
                } else {
                    Ok(left)
                };
            }
            BinaryOp::Or => {
                let left = self.eval(lhs, scope)?;
                return if is_truthy(&left) {
                    Ok(left)
                } else {
                    self.eval(rhs, scope)
                };
            }
            _ => {}
        }

        let left = self.eval(lhs, scope)?;
        let right = self.eval(rhs, scope)?;
        match op {
            BinaryOp::Add => add(&left, &right),
            BinaryOp::Sub => arithmetic(op, &left, &right, |a, b| a - b),
            BinaryOp::Mul => arithmetic(op, &left, &right, |a, b| a * b),
            BinaryOp::Div => arithmetic(op, &left, &right, |a, b| a / b),
            BinaryOp::Rem => arithmetic(op, &left, &right, |a, b| a % b),
            BinaryOp::Eq | BinaryOp::StrictEq => Ok(Value::Bool(values_equal(&left, &right))),
            BinaryOp::NotEq | BinaryOp::StrictNotEq => {
                Ok(Value::Bool(!values_equal(&left, &right)))
            }
            BinaryOp::Less => compare(op, &left, &right, Ordering::is_lt),
            BinaryOp::LessOrEqual => compare(op, &left, &right, Ordering::is_le),
            BinaryOp::Greater => compare(op, &left, &right, Ordering::is_gt),
            BinaryOp::GreaterOrEqual => compare(op, &left, &right, Ordering::is_ge),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }
}

fn literal(lit: &Literal) -> Result<Value, RenderError> {
    Ok(match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => number(*n, "literal")?,
        Literal::String(s) => Value::String(s.clone()),
    })
}

fn member(object: &Value, property: &str) -> Result<Value, RenderError> {
    match (object, property) {
        (Value::Object(entries), _) => Ok(entries.get(property).cloned().unwrap_or(Value::Null)),
        (Value::String(s), "length") => Ok(Value::from(s.chars().count())),
        (Value::Array(items), "length") => Ok(Value::from(items.len())),
        (other, _) => Err(RenderError::Type {
            message: format!("cannot read property '{}' of {}", property, kind(other)),
        }),
    }
}

fn index(object: &Value, index: &Value) -> Result<Value, RenderError> {
    match (object, index) {
        (Value::Array(items), Value::Number(n)) => {
            let position = n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as usize);
            Ok(position
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null))
        }
        (Value::Object(entries), Value::String(key)) => {
            Ok(entries.get(key).cloned().unwrap_or(Value::Null))
        }
        (object, index) => Err(RenderError::Type {
            message: format!("cannot index {} with {}", kind(object), kind(index)),
        }),
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, RenderError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(&operand))),
        UnaryOp::Neg | UnaryOp::Pos => {
            let n = as_number(&operand).ok_or_else(|| RenderError::Type {
                message: format!("cannot negate {}", kind(&operand)),
            })?;
            if op == UnaryOp::Neg {
                number(-n, "-")
            } else {
                number(n, "+")
            }
        }
    }
}

/// Numbers add; a string on either side concatenates
fn add(left: &Value, right: &Value) -> Result<Value, RenderError> {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        return number(a + b, "+");
    }
    if left.is_string() || right.is_string() {
        return Ok(Value::String(to_text(left)? + &to_text(right)?));
    }
    Err(RenderError::Type {
        message: format!("cannot add {} and {}", kind(left), kind(right)),
    })
}

fn arithmetic(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    apply: impl Fn(f64, f64) -> f64,
) -> Result<Value, RenderError> {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => number(apply(a, b), op.symbol()),
        _ => Err(RenderError::Type {
            message: format!(
                "operator '{}' needs numbers, found {} and {}",
                op.symbol(),
                kind(left),
                kind(right)
            ),
        }),
    }
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    test: impl Fn(Ordering) -> bool,
) -> Result<Value, RenderError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (as_number(left), as_number(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    match ordering {
        Some(ordering) => Ok(Value::Bool(test(ordering))),
        None => Err(RenderError::Type {
            message: format!(
                "cannot compare {} and {} with '{}'",
                kind(left),
                kind(right),
                op.symbol()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use serde_json::json;

    fn eval_with(source: &str, context: Value, undefined: UndefinedBehavior) -> Result<Value, RenderError> {
        let functions = Functions::with_builtins();
        let evaluator = Evaluator::new(&functions, undefined);
        let ctx = match context {
            Value::Object(map) => map,
            _ => panic!("Expected object context"),
        };
        let scope = Scope::new(&ctx);
        let expr = parse(source).expect("Should parse");
        evaluator.eval(&expr, &scope)
    }

    fn eval(source: &str, context: Value) -> Result<Value, RenderError> {
        eval_with(source, context, UndefinedBehavior::Strict)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("age + 1", json!({"age": 18})), Ok(json!(19)));
        assert_eq!(eval("7 % 4 * 2 - 1", json!({})), Ok(json!(5)));
        assert_eq!(eval("1 / 4", json!({})), Ok(json!(0.25)));
        assert_eq!(eval("-x", json!({"x": 2})), Ok(json!(-2)));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval(r#""hi" + name"#, json!({"name": "Jam"})), Ok(json!("hiJam")));
        assert_eq!(eval(r#"n + "px""#, json!({"n": 4})), Ok(json!("4px")));
        assert_eq!(eval("'a' + true", json!({})), Ok(json!("atrue")));
    }

    #[test]
    fn test_strict_equality() {
        assert_eq!(eval("num === 1", json!({"num": 1})), Ok(json!(true)));
        assert_eq!(eval("num === 1", json!({"num": 2})), Ok(json!(false)));
        assert_eq!(eval("num !== '1'", json!({"num": 1})), Ok(json!(true)));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(eval("a < b", json!({"a": 1, "b": 2})), Ok(json!(true)));
        assert_eq!(eval("'b' >= 'a'", json!({})), Ok(json!(true)));
        assert!(matches!(
            eval("1 < 'a'", json!({})),
            Err(RenderError::Type { .. })
        ));
    }

    #[test]
    fn test_connectives_short_circuit() {
        // The right side would fail with an undefined variable
        assert_eq!(eval("false && missing", json!({})), Ok(json!(false)));
        assert_eq!(eval("'x' || missing", json!({})), Ok(json!("x")));
        assert_eq!(eval("0 || 'fallback'", json!({})), Ok(json!("fallback")));
        assert_eq!(eval("!name", json!({"name": ""})), Ok(json!(true)));
    }

    #[test]
    fn test_member_and_index_access() {
        let ctx = json!({"user": {"name": "Jam", "tags": ["a", "b"]}});
        assert_eq!(eval("user.name", ctx.clone()), Ok(json!("Jam")));
        assert_eq!(eval("user.tags[1]", ctx.clone()), Ok(json!("b")));
        assert_eq!(eval("user.tags[5]", ctx.clone()), Ok(json!(null)));
        assert_eq!(eval("user['name']", ctx.clone()), Ok(json!("Jam")));
        assert_eq!(eval("user.missing", ctx.clone()), Ok(json!(null)));
        assert_eq!(eval("user.tags.length", ctx), Ok(json!(2)));
    }

    #[test]
    fn test_member_of_null_is_error() {
        let result = eval("user.missing.deeper", json!({"user": {}}));
        assert!(matches!(result, Err(RenderError::Type { .. })));
    }

    #[test]
    fn test_calls_and_methods() {
        let ctx = json!({"name": "jam", "names": ["a", "b"]});
        assert_eq!(eval("upper(name)", ctx.clone()), Ok(json!("JAM")));
        assert_eq!(eval("name.upper()", ctx.clone()), Ok(json!("JAM")));
        assert_eq!(eval("names.join('-')", ctx.clone()), Ok(json!("a-b")));
        assert_eq!(
            eval("nope(name)", ctx),
            Err(RenderError::UnknownFunction {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_object_literal_shorthand() {
        assert_eq!(
            eval("{ title, n: 1 }", json!({"title": "Dog"})),
            Ok(json!({"title": "Dog", "n": 1}))
        );
    }

    #[test]
    fn test_conditional() {
        assert_eq!(eval("n > 1 ? 'many' : 'one'", json!({"n": 3})), Ok(json!("many")));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            eval("missing", json!({})),
            Err(RenderError::UndefinedVariable {
                name: "missing".to_string()
            })
        );
        assert_eq!(
            eval_with("missing", json!({}), UndefinedBehavior::Lenient),
            Ok(json!(null))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval("1 / 0", json!({})),
            Err(RenderError::NonFinite { op: "/" })
        );
    }

    #[test]
    fn test_add_incompatible() {
        assert!(matches!(
            eval("[1] + 1", json!({})),
            Err(RenderError::Type { .. })
        ));
    }
}
