// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The values that flow through property validation.
//!
//! A property starts as a [`RawValue`], is type checked into a [`Validated`]
//! value by some [`DeclarativeType`](crate::types::DeclarativeType), and is
//! finally reduced to a [`Normalized`] value that the DDL builder consumes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use sr_fragment::ast::display::AstDisplay;
use sr_fragment::{parse_fragment, ColumnRef, Fragment, Ident, UnparsableFragment};

/// A property value as supplied by the model loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Unparsed text.
    Text(String),
    /// An already parsed fragment.
    Node(Fragment),
    /// A native list of values.
    List(Vec<RawValue>),
}

impl RawValue {
    /// Parses `text` into a [`RawValue::Node`], as the model loader does for
    /// values written as SQL.
    pub fn parsed(text: &str) -> Result<RawValue, UnparsableFragment> {
        Ok(RawValue::Node(parse_fragment(text)?))
    }

    /// Interprets the value as a fragment. Text is parsed, nodes are returned
    /// as is, and lists become tuples of their interpreted items.
    pub fn parse(&self) -> Result<Cow<'_, Fragment>, UnparsableFragment> {
        match self {
            RawValue::Text(text) => Ok(Cow::Owned(parse_fragment(text)?)),
            RawValue::Node(node) => Ok(Cow::Borrowed(node)),
            RawValue::List(items) => {
                let items = items
                    .iter()
                    .map(|item| item.parse().map(Cow::into_owned))
                    .collect::<Result<_, _>>()?;
                Ok(Cow::Owned(Fragment::Tuple(items)))
            }
        }
    }

    /// Like [`RawValue::parse`], but treats unparsable text as a mismatch.
    pub fn to_fragment(&self) -> Option<Cow<'_, Fragment>> {
        self.parse().ok()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawValue::Text(text) => write!(f, "{:?}", text),
            RawValue::Node(node) => write!(f, "{}", node),
            RawValue::List(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<Fragment> for RawValue {
    fn from(node: Fragment) -> Self {
        RawValue::Node(node)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::List(items)
    }
}

/// The outcome of type checking a raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The value has the expected shape.
    Match(Validated),
    /// The value does not have the expected shape. This is not an error:
    /// combinators use it to move on to the next candidate.
    NoMatch,
}

impl Validation {
    pub fn is_match(&self) -> bool {
        matches!(self, Validation::Match(_))
    }

    pub fn into_validated(self) -> Option<Validated> {
        match self {
            Validation::Match(validated) => Some(validated),
            Validation::NoMatch => None,
        }
    }
}

impl From<Option<Validated>> for Validation {
    fn from(validated: Option<Validated>) -> Self {
        match validated {
            Some(validated) => Validation::Match(validated),
            None => Validation::NoMatch,
        }
    }
}

/// A type-checked value, awaiting normalization.
///
/// Combinator results remember which sub-validator produced each part, so
/// that normalization can be routed back to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    Str(String),
    Node(Fragment),
    /// A `key = value` pair; the key is the left operand's name.
    Pair(String, Fragment),
    /// The value matched the `index`th alternative of a union.
    Choice { index: usize, value: Box<Validated> },
    /// One choice per sequence element.
    Sequence(Vec<Validated>),
    /// Structured tuple fields, keyed by canonical field name.
    Fields(BTreeMap<String, Validated>),
}

/// The canonical form of a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Str(String),
    Node(Fragment),
    Pair(String, Fragment),
    List(Vec<Normalized>),
    Tuple(Vec<Normalized>),
    Map(BTreeMap<String, Normalized>),
}

impl Normalized {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Normalized::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Fragment> {
        match self {
            Normalized::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The items of a list or tuple.
    pub fn as_items(&self) -> Option<&[Normalized]> {
        match self {
            Normalized::List(items) | Normalized::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Normalized>> {
        match self {
            Normalized::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Renders the value as a fragment. Strings become string literals and
    /// maps become tuples of `key = value` pairs.
    pub fn to_fragment(&self) -> Fragment {
        match self {
            Normalized::Str(s) => Fragment::string(s.as_str()),
            Normalized::Node(node) => node.clone(),
            Normalized::Pair(key, value) => {
                Fragment::pair(Fragment::column(key.as_str()), value.clone())
            }
            Normalized::List(items) | Normalized::Tuple(items) => {
                Fragment::Tuple(items.iter().map(Normalized::to_fragment).collect())
            }
            Normalized::Map(map) => Fragment::Tuple(
                map.iter()
                    .map(|(key, value)| {
                        Fragment::pair(Fragment::column(key.as_str()), value.to_fragment())
                    })
                    .collect(),
            ),
        }
    }

    /// The value as the text of a quoted DDL string.
    pub fn to_text(&self) -> String {
        match self {
            Normalized::Str(s) => s.clone(),
            Normalized::Node(node) => text_of(node).into_owned(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Normalized::Str(s) => write!(f, "{:?}", s),
            Normalized::Node(node) => write!(f, "{}", node),
            Normalized::Pair(key, value) => write!(f, "{} = {}", key, value),
            Normalized::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Normalized::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            Normalized::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .join(", ")
            ),
        }
    }
}

/// The identity normalization.
impl From<Validated> for Normalized {
    fn from(validated: Validated) -> Self {
        match validated {
            Validated::Str(s) => Normalized::Str(s),
            Validated::Node(node) => Normalized::Node(node),
            Validated::Pair(key, value) => Normalized::Pair(key, value),
            Validated::Choice { value, .. } => Normalized::from(*value),
            Validated::Sequence(items) => {
                Normalized::List(items.into_iter().map(Normalized::from).collect())
            }
            Validated::Fields(fields) => Normalized::Map(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Normalized::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Normalized values can be checked again by output validators.
impl From<Normalized> for RawValue {
    fn from(normalized: Normalized) -> Self {
        match normalized {
            Normalized::Str(s) => RawValue::Text(s),
            Normalized::Node(node) => RawValue::Node(node),
            Normalized::List(items) | Normalized::Tuple(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            other => RawValue::Node(other.to_fragment()),
        }
    }
}

/// The target of a normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalizedType {
    /// A plain string.
    Str,
    Identifier,
    /// A string literal.
    Literal,
    Column,
    /// The node itself.
    Expr,
}

impl fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            NormalizedType::Str => "string",
            NormalizedType::Identifier => "identifier",
            NormalizedType::Literal => "literal",
            NormalizedType::Column => "column",
            NormalizedType::Expr => "expression",
        })
    }
}

/// The text a node stands for: a name for identifiers and columns, the
/// unquoted text for literals, and SQL otherwise.
pub fn text_of(node: &Fragment) -> Cow<'_, str> {
    match node {
        Fragment::Identifier(ident) => Cow::Borrowed(ident.as_str()),
        Fragment::Column(column) => Cow::Borrowed(column.name()),
        Fragment::Literal(literal) => literal.text(),
        other => Cow::Owned(other.to_ast_string_simple()),
    }
}

/// Converts `node` to `target`.
pub(crate) fn convert(node: Fragment, target: NormalizedType) -> Normalized {
    match (target, node) {
        (NormalizedType::Str, node) => Normalized::Str(text_of(&node).into_owned()),
        (NormalizedType::Expr, node) => Normalized::Node(node),
        (NormalizedType::Identifier, node @ Fragment::Identifier(_)) => Normalized::Node(node),
        (NormalizedType::Identifier, Fragment::Column(column)) => {
            Normalized::Node(Fragment::Identifier(column.name))
        }
        (NormalizedType::Identifier, node) => {
            Normalized::Node(Fragment::identifier(text_of(&node).into_owned()))
        }
        (NormalizedType::Column, node @ Fragment::Column(_)) => Normalized::Node(node),
        (NormalizedType::Column, Fragment::Identifier(ident)) => {
            Normalized::Node(Fragment::Column(ColumnRef::new(ident)))
        }
        (NormalizedType::Column, node) => {
            Normalized::Node(Fragment::Column(ColumnRef::new(Ident::new(
                text_of(&node).into_owned(),
            ))))
        }
        (NormalizedType::Literal, node @ Fragment::Literal(_)) => Normalized::Node(node),
        (NormalizedType::Literal, node) => {
            Normalized::Node(Fragment::string(text_of(&node).into_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use sr_fragment::Literal;

    use super::*;

    #[test]
    fn conversions() {
        let column = Fragment::column("id");
        assert_eq!(
            convert(column.clone(), NormalizedType::Str),
            Normalized::Str("id".into())
        );
        assert_eq!(
            convert(column.clone(), NormalizedType::Identifier),
            Normalized::Node(Fragment::identifier("id"))
        );
        assert_eq!(
            convert(Fragment::identifier("id"), NormalizedType::Column),
            Normalized::Node(column.clone())
        );
        assert_eq!(
            convert(column, NormalizedType::Literal),
            Normalized::Node(Fragment::string("id"))
        );
        assert_eq!(
            convert(Fragment::Literal(Literal::Boolean(true)), NormalizedType::Str),
            Normalized::Str("TRUE".into())
        );
    }

    #[test]
    fn normalized_maps_render_as_pairs() {
        let map = Normalized::Map(BTreeMap::from([
            ("buckets".to_string(), Normalized::Node(Fragment::number("10"))),
            ("kind".to_string(), Normalized::Str("HASH".into())),
        ]));
        assert_eq!(map.to_fragment().to_string(), "(buckets = 10, kind = 'HASH')");
        assert_eq!(
            RawValue::from(map),
            RawValue::parsed("(buckets = 10, kind = 'HASH')").unwrap()
        );
    }

    #[test]
    fn lists_parse_as_tuples() {
        let raw = RawValue::List(vec!["id".into(), "dt".into()]);
        assert_eq!(
            raw.parse().unwrap().into_owned(),
            Fragment::Tuple(vec![Fragment::column("id"), Fragment::column("dt")])
        );
        assert_eq!(RawValue::Text("id dt".into()).to_fragment(), None);
    }
}
