// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression AST and constructors.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::{Add, Div, Mul, Not, Sub};

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNe,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Operator text as written in an expression.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::StrictEq => "===",
            Self::StrictNe => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Binding strength, higher binds tighter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Or => 2,
            Self::And => 3,
            Self::StrictEq | Self::StrictNe => 7,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 8,
            Self::Add | Self::Sub => 10,
            Self::Mul | Self::Div => 11,
        }
    }
}

/// A Vega expression.
///
/// `Raw` is an escape hatch for runtime-specific formatter calls that are emitted verbatim; the
/// reference evaluator treats it as opaque.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Numeric literal.
    Number(f64),
    /// String literal.
    String(String),
    /// A bare name: a signal, or one of the runtime scopes (`datum`, `event`, `parent`).
    Ident(String),
    /// Dotted property access, `object.property`.
    Member {
        /// Accessed value.
        object: Box<Expr>,
        /// Property name.
        property: String,
    },
    /// Computed access, `object[index]`.
    Index {
        /// Accessed value.
        object: Box<Expr>,
        /// Key or position.
        index: Box<Expr>,
    },
    /// Object literal with identifier keys, `{key: value}`.
    Object(Vec<(String, Expr)>),
    /// Prefix operator application.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Infix operator application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// Condition.
        test: Box<Expr>,
        /// Value when the condition is truthy.
        consequent: Box<Expr>,
        /// Value otherwise.
        alternate: Box<Expr>,
    },
    /// Call of a named runtime function.
    Call {
        /// Function name.
        callee: String,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// Expression text emitted verbatim.
    Raw(String),
}

impl Expr {
    /// A bare identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// A string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// A numeric literal.
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// The current data object, `datum`.
    pub fn datum() -> Self {
        Self::ident("datum")
    }

    /// The triggering event, `event`.
    pub fn event() -> Self {
        Self::ident("event")
    }

    /// `datum["field"]`
    pub fn datum_field(field: &str) -> Self {
        Self::datum().field(field)
    }

    /// Verbatim expression text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// A call of `callee` with `args`.
    pub fn call(callee: impl Into<String>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Call {
            callee: callee.into(),
            args: args.into_iter().collect(),
        }
    }

    /// An object literal.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `test ? consequent : alternate`
    pub fn conditional(test: Self, consequent: Self, alternate: Self) -> Self {
        Self::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    /// `self["name"]`
    pub fn field(self, name: &str) -> Self {
        self.index(Self::string(name))
    }

    /// `self[index]`
    pub fn index(self, index: Self) -> Self {
        Self::Index {
            object: Box::new(self),
            index: Box::new(index),
        }
    }

    /// `self.name`
    pub fn prop(self, name: impl Into<String>) -> Self {
        Self::Member {
            object: Box::new(self),
            property: name.into(),
        }
    }

    /// Applies an infix operator with `self` on the left.
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// `self && right`
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// `self || right`
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// `self === right`
    pub fn strict_eq(self, right: Self) -> Self {
        self.binary(BinaryOp::StrictEq, right)
    }

    /// `self !== right`
    pub fn strict_ne(self, right: Self) -> Self {
        self.binary(BinaryOp::StrictNe, right)
    }

    /// `self > right`
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// `self < right`
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// Returns the identifier name if this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Visits every identifier referenced by this expression, in source order.
    ///
    /// Object keys and dotted property names are not identifiers and are skipped.
    pub fn for_each_ident(&self, f: &mut impl FnMut(&str)) {
        match self {
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) | Self::Raw(_) => {}
            Self::Ident(name) => f(name),
            Self::Member { object, .. } => object.for_each_ident(f),
            Self::Index { object, index } => {
                object.for_each_ident(f);
                index.for_each_ident(f);
            }
            Self::Object(entries) => {
                for (_, value) in entries {
                    value.for_each_ident(f);
                }
            }
            Self::Unary { operand, .. } => operand.for_each_ident(f),
            Self::Binary { left, right, .. } => {
                left.for_each_ident(f);
                right.for_each_ident(f);
            }
            Self::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.for_each_ident(f);
                consequent.for_each_ident(f);
                alternate.for_each_ident(f);
            }
            Self::Call { args, .. } => {
                for arg in args {
                    arg.for_each_ident(f);
                }
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl $trait for Expr {
            type Output = Self;

            fn $method(self, right: Self) -> Self {
                self.binary(BinaryOp::$op, right)
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }
}
