// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression evaluation over JSON values.
//!
//! Semantics follow the runtime's JavaScript-based expression language closely enough for the
//! expressions the compiler emits: truthiness, short-circuiting `&&`/`||` that return operands,
//! strict equality on primitives, and a handful of built-in functions.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map, Value};
use vizspec_expr::{BinaryOp, Expr, UnaryOp};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Error evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// Verbatim expression text; only the real runtime can evaluate it.
    #[error("opaque expression `{0}` cannot be evaluated")]
    Opaque(String),
    /// An identifier that is neither a signal nor a bound scope name.
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),
    /// A function the evaluator does not implement.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// A function called with the wrong number of arguments.
    #[error("`{function}` expects {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: String,
        /// Expected count.
        expected: usize,
        /// Actual count.
        found: usize,
    },
}

/// What an expression can see besides its literal text.
pub trait Scope {
    /// Value of a signal, or `None` if no such signal exists.
    fn signal(&self, name: &str) -> Option<&Value>;

    /// The current datum, if evaluating against an item.
    fn datum(&self) -> Option<&Value> {
        None
    }

    /// The triggering event, if evaluating an event handler.
    fn event(&self) -> Option<&Value> {
        None
    }

    /// `[width, height]` of the embedding container; non-finite when unknown.
    fn container_size(&self) -> [f64; 2] {
        [f64::NAN, f64::NAN]
    }

    /// Current domain of a scale, or `None` if unknown.
    fn scale_domain(&self, _scale: &str) -> Option<&Value> {
        None
    }
}

/// JavaScript truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion; `NaN` when the value has no numeric reading.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Strict equality. Arrays and objects are never strictly equal (they are compared by identity).
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(_), Value::Number(_)) => to_number(a) == to_number(b),
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

fn number(n: f64) -> Value {
    // Non-finite numbers have no JSON form.
    Value::from(n)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::from("null"),
        other => other.to_string(),
    }
}

/// Property key of an index value, with integral numbers printed without a fraction (`1`, not
/// `1.0`).
fn property_key(index: &Value) -> String {
    match index {
        Value::String(s) => s.clone(),
        Value::Number(_) => {
            let n = to_number(index);
            if n == 0.0 {
                String::from("0")
            } else if n.is_finite() && n.floor() == n {
                format!("{n:.0}")
            } else {
                display(index)
            }
        }
        other => display(other),
    }
}

/// Evaluates `expr` in `scope`.
pub fn eval(expr: &Expr, scope: &dyn Scope) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Ident(name) => ident(name, scope),
        Expr::Member { object, property } => Ok(member(&eval(object, scope)?, property)),
        Expr::Index { object, index } => {
            let object = eval(object, scope)?;
            let key = property_key(&eval(index, scope)?);
            Ok(member(&object, &key))
        }
        Expr::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), eval(value, scope)?);
            }
            Ok(Value::Object(map))
        }
        Expr::Unary { op, operand } => {
            let v = eval(operand, scope)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!truthy(&v)),
                UnaryOp::Neg => number(-to_number(&v)),
            })
        }
        Expr::Binary { op, left, right } => binary(*op, left, right, scope),
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if truthy(&eval(test, scope)?) {
                eval(consequent, scope)
            } else {
                eval(alternate, scope)
            }
        }
        Expr::Call { callee, args } => {
            let args = args
                .iter()
                .map(|a| eval(a, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call(callee, &args, scope)
        }
        Expr::Raw(text) => Err(EvalError::Opaque(text.clone())),
    }
}

fn ident(name: &str, scope: &dyn Scope) -> Result<Value, EvalError> {
    let found = match name {
        "datum" => scope.datum(),
        "event" => scope.event(),
        _ => scope.signal(name),
    };
    match (name, found) {
        (_, Some(v)) => Ok(v.clone()),
        // Unbound scopes read as undefined, which behaves like null here.
        ("datum" | "event", None) => Ok(Value::Null),
        (_, None) => Err(EvalError::UnknownIdentifier(String::from(name))),
    }
}

fn member(object: &Value, key: &str) -> Value {
    match object {
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
        Value::Array(items) => match key {
            "length" => Value::from(items.len()),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Null),
        },
        Value::String(s) if key == "length" => Value::from(s.chars().count()),
        _ => Value::Null,
    }
}

fn binary(op: BinaryOp, left: &Expr, right: &Expr, scope: &dyn Scope) -> Result<Value, EvalError> {
    let l = eval(left, scope)?;
    let r = || eval(right, scope);
    Ok(match op {
        BinaryOp::And => return if truthy(&l) { r() } else { Ok(l) },
        BinaryOp::Or => return if truthy(&l) { Ok(l) } else { r() },
        BinaryOp::StrictEq => Value::Bool(strict_eq(&l, &r()?)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(&l, &r()?)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let r = r()?;
            let ord = match (&l, &r) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => to_number(&l).partial_cmp(&to_number(&r)),
            };
            Value::Bool(ord.is_some_and(|o| match op {
                BinaryOp::Lt => o.is_lt(),
                BinaryOp::Le => o.is_le(),
                BinaryOp::Gt => o.is_gt(),
                _ => o.is_ge(),
            }))
        }
        BinaryOp::Add => {
            let r = r()?;
            match (&l, &r) {
                (Value::String(_), _) | (_, Value::String(_)) => {
                    let mut s = display(&l);
                    s.push_str(&display(&r));
                    Value::String(s)
                }
                _ => number(to_number(&l) + to_number(&r)),
            }
        }
        BinaryOp::Sub => number(to_number(&l) - to_number(&r()?)),
        BinaryOp::Mul => number(to_number(&l) * to_number(&r()?)),
        BinaryOp::Div => number(to_number(&l) / to_number(&r()?)),
    })
}

fn arity(function: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Arity {
            function: String::from(function),
            expected,
            found: args.len(),
        })
    }
}

fn call(callee: &str, args: &[Value], scope: &dyn Scope) -> Result<Value, EvalError> {
    match callee {
        "isFinite" => {
            arity(callee, args, 1)?;
            Ok(Value::Bool(
                matches!(args[0], Value::Number(_)) && to_number(&args[0]).is_finite(),
            ))
        }
        "containerSize" => {
            arity(callee, args, 0)?;
            let [w, h] = scope.container_size();
            Ok(Value::Array(alloc::vec![number(w), number(h)]))
        }
        "ceil" => {
            arity(callee, args, 1)?;
            Ok(number(to_number(&args[0]).ceil()))
        }
        "floor" => {
            arity(callee, args, 1)?;
            Ok(number(to_number(&args[0]).floor()))
        }
        "length" => {
            arity(callee, args, 1)?;
            Ok(member(&args[0], "length"))
        }
        "indexof" => {
            arity(callee, args, 2)?;
            let position = match &args[0] {
                Value::Array(items) => items.iter().position(|v| strict_eq(v, &args[1])),
                Value::String(s) => s.find(display(&args[1]).as_str()),
                _ => None,
            };
            Ok(position.map_or_else(|| Value::from(-1), Value::from))
        }
        "domain" => {
            arity(callee, args, 1)?;
            let name = display(&args[0]);
            Ok(scope.scale_domain(&name).cloned().unwrap_or(Value::Null))
        }
        "combineInternalExternal" => {
            arity(callee, args, 2)?;
            Ok(if args[0].is_null() {
                args[1].clone()
            } else {
                args[0].clone()
            })
        }
        _ => Err(EvalError::UnknownFunction(String::from(callee))),
    }
}
