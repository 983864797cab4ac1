// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression rendering.
//!
//! Parentheses are inserted only where operator precedence requires them, so rendered text stays
//! close to what a person would write by hand.

use core::fmt::{self, Display, Formatter, Write};

use serde::{Serialize, Serializer};

use crate::expr::{Expr, UnaryOp};

const PREC_RAW: u8 = 0;
const PREC_CONDITIONAL: u8 = 1;
const PREC_UNARY: u8 = 12;
const PREC_POSTFIX: u8 = 13;
const PREC_PRIMARY: u8 = 14;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Self::Raw(_) => PREC_RAW,
            Self::Conditional { .. } => PREC_CONDITIONAL,
            Self::Binary { op, .. } => op.precedence(),
            Self::Unary { .. } => PREC_UNARY,
            Self::Member { .. } | Self::Index { .. } | Self::Call { .. } => PREC_POSTFIX,
            Self::Null
            | Self::Bool(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Ident(_)
            | Self::Object(_) => PREC_PRIMARY,
        }
    }

    /// Writes `self`, parenthesized when it binds looser than `min`.
    fn write_operand(&self, f: &mut Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            f.write_char('(')?;
            Display::fmt(self, f)?;
            f.write_char(')')
        } else {
            Display::fmt(self, f)
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write_number(f, *n),
            Self::String(s) => write_string(f, s),
            Self::Ident(name) => f.write_str(name),
            Self::Raw(text) => f.write_str(text),
            Self::Member { object, property } => {
                object.write_operand(f, PREC_POSTFIX)?;
                write!(f, ".{property}")
            }
            Self::Index { object, index } => {
                object.write_operand(f, PREC_POSTFIX)?;
                write!(f, "[{index}]")
            }
            Self::Object(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_identifier(key) {
                        f.write_str(key)?;
                    } else {
                        write_string(f, key)?;
                    }
                    write!(f, ": {value}")?;
                }
                f.write_char('}')
            }
            Self::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                })?;
                operand.write_operand(f, PREC_UNARY)
            }
            Self::Binary { op, left, right } => {
                let prec = op.precedence();
                left.write_operand(f, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Left-associative: an equal-precedence right operand needs parentheses.
                right.write_operand(f, prec + 1)
            }
            Self::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.write_operand(f, PREC_CONDITIONAL + 1)?;
                f.write_str(" ? ")?;
                consequent.write_operand(f, PREC_CONDITIONAL)?;
                f.write_str(" : ")?;
                alternate.write_operand(f, PREC_CONDITIONAL)
            }
            Self::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.write_operand(f, PREC_RAW)?;
                }
                f.write_char(')')
            }
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn write_number(f: &mut Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}

fn write_string(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn member_chains_render_without_parentheses() {
        let e = Expr::datum()
            .and(Expr::datum().prop("datum"))
            .and(Expr::object([(
                "time_",
                Expr::datum().prop("datum").field("time_"),
            )]));
        assert_eq!(
            e.to_string(),
            r#"datum && datum.datum && {time_: datum.datum["time_"]}"#
        );
    }

    #[test]
    fn looser_operands_are_parenthesized() {
        let width = Expr::ident("datum").prop("bounds").prop("x2")
            - Expr::ident("datum").prop("bounds").prop("x1");
        let e = Expr::datum().prop("x") - width / Expr::number(2.0);
        assert_eq!(
            e.to_string(),
            "datum.x - (datum.bounds.x2 - datum.bounds.x1) / 2"
        );

        let right_nested = Expr::ident("a") - (Expr::ident("b") - Expr::ident("c"));
        assert_eq!(right_nested.to_string(), "a - (b - c)");
    }

    #[test]
    fn conditional_and_calls() {
        let size0 = Expr::call("containerSize", []).index(Expr::number(0.0));
        let e = Expr::conditional(
            Expr::call("isFinite", [size0.clone()]),
            size0,
            Expr::number(200.0),
        );
        assert_eq!(
            e.to_string(),
            "isFinite(containerSize()[0]) ? containerSize()[0] : 200"
        );
    }

    #[test]
    fn strings_are_escaped() {
        let e = Expr::string("a \"quoted\" \\ name");
        assert_eq!(e.to_string(), r#""a \"quoted\" \\ name""#);
        assert_eq!(Expr::number(-1.0).to_string(), "-1");
        assert_eq!(Expr::number(0.35).to_string(), "0.35");
    }

    #[test]
    fn negation_wraps_binary_operands() {
        let e = !(Expr::ident("a").and(Expr::ident("b")));
        assert_eq!(e.to_string(), "!(a && b)");
    }
}
