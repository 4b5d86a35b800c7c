// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Parsing of property text into [`Fragment`]s.
//!
//! The heavy lifting is done by `sqlparser` with its generic dialect. Its
//! expression tree is then lowered into a [`Fragment`], keeping the node
//! kinds property validation cares about and collapsing everything else into
//! [`Fragment::Other`].

use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident as SqlIdent,
    Value,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::ast::{ColumnRef, Fragment, Function, FunctionKind, Ident, Literal};

/// Functions the StarRocks expression language defines and that may appear
/// in partitioning and distribution expressions.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "cast",
    "date_format",
    "date_trunc",
    "from_unixtime",
    "from_unixtime_ms",
    "str2date",
    "str_to_date",
    "substr",
    "time_slice",
    "to_date",
];

/// The error returned when property text is not a valid expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to parse {text:?}: {message}")]
pub struct UnparsableFragment {
    /// The text that failed to parse.
    pub text: String,
    /// The parser's description of the problem.
    pub message: String,
}

/// Parses `text` as a comma separated list of expressions.
///
/// A single expression yields its own node; several yield a
/// [`Fragment::Tuple`]. The empty group `()` yields an empty tuple.
pub fn parse_fragment(text: &str) -> Result<Fragment, UnparsableFragment> {
    let err = |message: String| UnparsableFragment {
        text: text.to_string(),
        message,
    };

    if is_empty_group(text) {
        return Ok(Fragment::Tuple(vec![]));
    }

    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect)
        .try_with_sql(text)
        .map_err(|e| err(e.to_string()))?;
    let mut exprs = parser
        .parse_comma_separated(Parser::parse_expr)
        .map_err(|e| err(e.to_string()))?;
    parser
        .expect_token(&Token::EOF)
        .map_err(|e| err(e.to_string()))?;

    if exprs.len() == 1 {
        let expr = exprs.remove(0);
        Ok(lower_expr(expr))
    } else {
        Ok(Fragment::Tuple(exprs.into_iter().map(lower_expr).collect()))
    }
}

fn is_empty_group(text: &str) -> bool {
    let inner = text.trim();
    match inner.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(rest) => rest.trim().is_empty(),
        None => false,
    }
}

fn lower_ident(ident: SqlIdent) -> Ident {
    match ident.quote_style {
        Some(quote) => Ident::with_quote(ident.value, quote),
        None => Ident::new(ident.value),
    }
}

fn lower_expr(expr: Expr) -> Fragment {
    match expr {
        Expr::Identifier(ident) => Fragment::Column(ColumnRef::new(lower_ident(ident))),
        Expr::CompoundIdentifier(mut parts) => match parts.pop() {
            Some(name) => Fragment::Column(ColumnRef {
                qualifier: parts.into_iter().map(lower_ident).collect(),
                name: lower_ident(name),
            }),
            None => Fragment::Other(String::new()),
        },
        Expr::Value(value) => match value.value {
            Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
                Fragment::Literal(Literal::String(s))
            }
            Value::Number(n, _) => Fragment::Literal(Literal::Number(n)),
            Value::Boolean(b) => Fragment::Literal(Literal::Boolean(b)),
            Value::Null => Fragment::Literal(Literal::Null),
            other => Fragment::Other(other.to_string()),
        },
        Expr::Nested(inner) => Fragment::Paren(Box::new(lower_expr(*inner))),
        Expr::Tuple(items) => Fragment::Tuple(items.into_iter().map(lower_expr).collect()),
        Expr::Array(array) => Fragment::Array(array.elem.into_iter().map(lower_expr).collect()),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => Fragment::pair(lower_expr(*left), lower_expr(*right)),
        Expr::Function(func) => {
            let sql = func.to_string();
            let args = match func.args {
                FunctionArguments::None => Some(vec![]),
                FunctionArguments::List(list) => list
                    .args
                    .into_iter()
                    .map(|arg| match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => Some(lower_expr(e)),
                        _ => None,
                    })
                    .collect(),
                FunctionArguments::Subquery(_) => None,
            };
            match args {
                Some(args) => {
                    let name = func.name.to_string();
                    let kind = if BUILTIN_FUNCTIONS
                        .iter()
                        .any(|builtin| builtin.eq_ignore_ascii_case(&name))
                    {
                        FunctionKind::Builtin
                    } else {
                        FunctionKind::Anonymous
                    };
                    Fragment::Function(Function { name, args, kind })
                }
                None => Fragment::Other(sql),
            }
        }
        other => Fragment::Other(other.to_string()),
    }
}
