// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::borrow::Cow;
use std::fmt;

use crate::ast::display::{self, AstDisplay, AstFormatter};

/// Primitive SQL values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    /// `'string value'`
    String(String),
    /// Numeric value, kept as written.
    Number(String),
    /// `TRUE` or `FALSE`
    Boolean(bool),
    /// `NULL`
    Null,
}

impl Literal {
    /// The literal's text without any quoting.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Literal::String(s) | Literal::Number(s) => Cow::Borrowed(s),
            Literal::Boolean(true) => Cow::Borrowed("TRUE"),
            Literal::Boolean(false) => Cow::Borrowed("FALSE"),
            Literal::Null => Cow::Borrowed("NULL"),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Literal::String(_))
    }
}

impl AstDisplay for Literal {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match self {
            Literal::String(s) => {
                f.write_str("'");
                f.write_str(display::escape_single_quote_string(s));
                f.write_str("'");
            }
            Literal::Number(n) => f.write_str(n),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Null => f.write_str("NULL"),
        }
    }
}
impl_display!(Literal);
