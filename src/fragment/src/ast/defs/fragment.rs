// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use crate::ast::display::{self, AstDisplay, AstFormatter};
use crate::ast::{ColumnRef, Ident, Literal};

/// An expression fragment.
///
/// The set of node kinds is closed: property validators only ever need to
/// tell identifiers, columns, literals, groups, key=value pairs and function
/// calls apart. Any other expression is kept as [`Fragment::Other`] with its
/// SQL text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fragment {
    /// A bare name that is not a column reference.
    Identifier(Ident),
    /// A column reference, e.g. `id` or `t.id`.
    Column(ColumnRef),
    /// A literal value.
    Literal(Literal),
    /// A comma separated list, e.g. `(id, dt)` or a top level `id, dt`.
    Tuple(Vec<Fragment>),
    /// A single parenthesized expression, e.g. `(id)`.
    Paren(Box<Fragment>),
    /// An array constructor, e.g. `[id, dt]`.
    Array(Vec<Fragment>),
    /// A binary equality, e.g. `kind = 'HASH'`.
    Eq(Box<Fragment>, Box<Fragment>),
    /// A function call.
    Function(Function),
    /// Any other expression, rendered as SQL.
    Other(String),
}

impl Fragment {
    /// Returns an unqualified, unquoted column reference.
    pub fn column<S: Into<String>>(name: S) -> Fragment {
        Fragment::Column(ColumnRef::new(Ident::new(name.into())))
    }

    /// Returns an unquoted identifier.
    pub fn identifier<S: Into<String>>(name: S) -> Fragment {
        Fragment::Identifier(Ident::new(name.into()))
    }

    /// Returns a string literal.
    pub fn string<S: Into<String>>(value: S) -> Fragment {
        Fragment::Literal(Literal::String(value.into()))
    }

    /// Returns a numeric literal.
    pub fn number<S: Into<String>>(value: S) -> Fragment {
        Fragment::Literal(Literal::Number(value.into()))
    }

    pub fn pair(left: Fragment, right: Fragment) -> Fragment {
        Fragment::Eq(Box::new(left), Box::new(right))
    }

    /// The name this node carries, if any: the identifier or column name, the
    /// text of a string or numeric literal, or a function's name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Fragment::Identifier(ident) => Some(ident.as_str()),
            Fragment::Column(column) => Some(column.name()),
            Fragment::Literal(Literal::String(s) | Literal::Number(s)) => Some(s),
            Fragment::Function(func) => Some(&func.name),
            _ => None,
        }
    }

    /// For string literals and quoted, unqualified column references, returns
    /// the text inside the quotes.
    ///
    /// The generic dialect reads `"id, dt"` as a quoted identifier, so both
    /// forms are how users write a value as plain text.
    pub fn quoted_text(&self) -> Option<&str> {
        match self {
            Fragment::Literal(Literal::String(s)) => Some(s),
            Fragment::Column(ColumnRef { qualifier, name })
                if qualifier.is_empty() && name.is_quoted() =>
            {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    /// A short description of the node kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fragment::Identifier(_) => "identifier",
            Fragment::Column(_) => "column",
            Fragment::Literal(_) => "literal",
            Fragment::Tuple(_) => "tuple",
            Fragment::Paren(_) => "parenthesized expression",
            Fragment::Array(_) => "array",
            Fragment::Eq(_, _) => "key=value pair",
            Fragment::Function(_) => "function call",
            Fragment::Other(_) => "expression",
        }
    }
}

impl AstDisplay for Fragment {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match self {
            Fragment::Identifier(ident) => f.write_node(ident),
            Fragment::Column(column) => f.write_node(column),
            Fragment::Literal(literal) => f.write_node(literal),
            Fragment::Tuple(items) => {
                f.write_str("(");
                f.write_node(&display::comma_separated(items));
                f.write_str(")");
            }
            Fragment::Paren(inner) => {
                f.write_str("(");
                f.write_node(inner);
                f.write_str(")");
            }
            Fragment::Array(items) => {
                f.write_str("[");
                f.write_node(&display::comma_separated(items));
                f.write_str("]");
            }
            Fragment::Eq(left, right) => {
                f.write_node(left);
                f.write_str(" = ");
                f.write_node(right);
            }
            Fragment::Function(func) => f.write_node(func),
            Fragment::Other(sql) => f.write_str(sql),
        }
    }
}
impl_display!(Fragment);

/// Whether a function name is one the StarRocks expression language defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FunctionKind {
    /// A built-in scalar function, e.g. `date_trunc`.
    Builtin,
    /// Any other name, e.g. the `RANGE`, `LIST` or `HASH` partitioning
    /// pseudo-functions.
    Anonymous,
}

/// A function call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Function {
    pub name: String,
    pub args: Vec<Fragment>,
    pub kind: FunctionKind,
}

impl Function {
    /// Reports whether the function is called `name`, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl AstDisplay for Function {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        f.write_str(&self.name);
        f.write_str("(");
        f.write_node(&display::comma_separated(&self.args));
        f.write_str(")");
    }
}
impl_display!(Function);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_modes() {
        let partition = Fragment::Function(Function {
            name: "date_trunc".into(),
            args: vec![Fragment::string("day"), Fragment::column("dt")],
            kind: FunctionKind::Builtin,
        });
        assert_eq!(partition.to_ast_string_simple(), "date_trunc('day', dt)");
        assert_eq!(partition.to_ast_string_stable(), "date_trunc('day', `dt`)");

        let pair = Fragment::pair(
            Fragment::column("columns"),
            Fragment::Tuple(vec![Fragment::column("id"), Fragment::column("dt")]),
        );
        assert_eq!(pair.to_string(), "columns = (id, dt)");
    }

    #[test]
    fn quoted_text() {
        let quoted = Fragment::Column(ColumnRef::new(Ident::with_quote("id, dt", '"')));
        assert_eq!(quoted.quoted_text(), Some("id, dt"));
        assert_eq!(Fragment::string("dt").quoted_text(), Some("dt"));
        assert_eq!(Fragment::column("dt").quoted_text(), None);
        assert_eq!(Fragment::number("10").quoted_text(), None);
    }
}
