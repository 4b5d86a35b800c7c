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

/// An identifier, remembering the quote character it was written with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident {
    value: String,
    quote_style: Option<char>,
}

impl Ident {
    /// Creates an unquoted identifier.
    pub fn new<S: Into<String>>(value: S) -> Self {
        Ident {
            value: value.into(),
            quote_style: None,
        }
    }

    /// Creates an identifier that was written inside `quote`.
    pub fn with_quote<S: Into<String>>(value: S, quote: char) -> Self {
        Ident {
            value: value.into(),
            quote_style: Some(quote),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    pub fn quote_style(&self) -> Option<char> {
        self.quote_style
    }

    pub fn is_quoted(&self) -> bool {
        self.quote_style.is_some()
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Ident::new(value)
    }
}

impl From<String> for Ident {
    fn from(value: String) -> Self {
        Ident::new(value)
    }
}

impl AstDisplay for Ident {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        // StarRocks only understands backtick quoting, whatever the author used.
        if f.stable() || self.is_quoted() {
            f.write_str("`");
            f.write_str(display::escape_backtick(&self.value));
            f.write_str("`");
        } else {
            f.write_str(&self.value);
        }
    }
}
impl_display!(Ident);

/// A reference to a column, optionally qualified by table and database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnRef {
    pub qualifier: Vec<Ident>,
    pub name: Ident,
}

impl ColumnRef {
    pub fn new<I: Into<Ident>>(name: I) -> Self {
        ColumnRef {
            qualifier: vec![],
            name: name.into(),
        }
    }

    /// The unqualified column name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl AstDisplay for ColumnRef {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        for part in &self.qualifier {
            f.write_node(part);
            f.write_str(".");
        }
        f.write_node(&self.name);
    }
}
impl_display!(ColumnRef);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_rendering() {
        let cases = vec![
            (Ident::new("id"), "id", "`id`"),
            (Ident::with_quote("id, dt", '"'), "`id, dt`", "`id, dt`"),
            (Ident::with_quote("a`b", '`'), "`a``b`", "`a``b`"),
        ];
        for (ident, simple, stable) in cases {
            assert_eq!(ident.to_ast_string_simple(), simple);
            assert_eq!(ident.to_ast_string_stable(), stable);
        }
    }

    #[test]
    fn qualified_column() {
        let column = ColumnRef {
            qualifier: vec![Ident::new("db"), Ident::new("t")],
            name: Ident::new("id"),
        };
        assert_eq!(column.to_string(), "db.t.id");
        assert_eq!(column.to_ast_string_stable(), "`db`.`t`.`id`");
        assert_eq!(column.name(), "id");
    }
}
