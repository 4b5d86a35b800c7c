// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Unions and sequences of declarative types.

use itertools::Itertools;
use sr_fragment::{parse_fragment, Fragment};

use crate::error::{SchemaError, ValidationError};
use crate::types::{DeclarativeType, TypeRef};
use crate::value::{Normalized, RawValue, Validated, Validation};

/// Accepts a value if any of its types does.
///
/// Types are tried in declaration order and the first match wins, so the
/// order decides how ambiguous values are read.
#[derive(Debug, Clone)]
pub struct AnyOf {
    types: Vec<TypeRef>,
}

impl AnyOf {
    pub fn new(types: Vec<TypeRef>) -> Result<Self, SchemaError> {
        if types.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        Ok(AnyOf { types })
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }
}

impl DeclarativeType for AnyOf {
    fn describe(&self) -> String {
        format!(
            "AnyOf({})",
            self.types.iter().map(|ty| ty.describe()).join(" | ")
        )
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        for (index, ty) in self.types.iter().enumerate() {
            if let Validation::Match(validated) = ty.validate(value)? {
                return Ok(Validation::Match(Validated::Choice {
                    index,
                    value: Box::new(validated),
                }));
            }
        }
        Ok(Validation::NoMatch)
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        match validated {
            Validated::Choice { index, value } => match self.types.get(index) {
                Some(ty) => ty.normalize(*value),
                None => Normalized::from(*value),
            },
            other => Normalized::from(other),
        }
    }

    fn accepts_plain_text(&self) -> bool {
        self.types.iter().any(|ty| ty.accepts_plain_text())
    }

    fn alternatives(&self) -> Option<&[TypeRef]> {
        Some(&self.types)
    }
}

/// The shape of a normalized sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceShape {
    #[default]
    List,
    Tuple,
}

/// Accepts a group of values, each of which matches one of the element types.
#[derive(Debug, Clone)]
pub struct SequenceOf {
    elements: AnyOf,
    allow_single: bool,
    reparse_quoted_text: bool,
    shape: SequenceShape,
}

impl SequenceOf {
    pub fn new(types: Vec<TypeRef>) -> Result<Self, SchemaError> {
        if types.is_empty() {
            return Err(SchemaError::EmptySequence);
        }
        Ok(SequenceOf {
            elements: AnyOf::new(types)?,
            allow_single: false,
            reparse_quoted_text: false,
            shape: SequenceShape::List,
        })
    }

    /// Accepts a lone value as a sequence of one.
    pub fn allow_single(mut self) -> Self {
        self.allow_single = true;
        self
    }

    /// Reads string literals and double-quoted names as the text of the group, so
    /// that `'id, dt'` and `"id, dt"` both mean the columns `id` and `dt`.
    pub fn reparse_quoted_text(mut self) -> Self {
        self.reparse_quoted_text = true;
        self
    }

    pub fn shape(mut self, shape: SequenceShape) -> Self {
        self.shape = shape;
        self
    }

    /// Splits `value` into its elements.
    fn extract(&self, value: &RawValue) -> Option<Vec<RawValue>> {
        match value {
            RawValue::List(items) => Some(items.clone()),
            RawValue::Text(text) => match parse_fragment(text) {
                Ok(node) => self.extract_node(node, true),
                Err(_) if self.allow_single && self.elements.accepts_plain_text() => {
                    Some(vec![value.clone()])
                }
                Err(_) => None,
            },
            RawValue::Node(node) => self.extract_node(node.clone(), true),
        }
    }

    fn extract_node(&self, node: Fragment, reparse: bool) -> Option<Vec<RawValue>> {
        let nodes = |items: Vec<Fragment>| -> Option<Vec<RawValue>> {
            Some(items.into_iter().map(RawValue::Node).collect())
        };
        match node {
            Fragment::Tuple(items) | Fragment::Array(items) => nodes(items),
            Fragment::Paren(inner) => match *inner {
                Fragment::Tuple(items) => nodes(items),
                inner => nodes(vec![inner]),
            },
            node if reparse && self.reparse_quoted_text && reparsable_text(&node).is_some() => {
                let text = reparsable_text(&node).unwrap_or_default().to_string();
                match parse_fragment(&text) {
                    Ok(reparsed) => self.extract_node(reparsed, false),
                    Err(_) if self.allow_single => Some(vec![RawValue::Text(text)]),
                    Err(_) => None,
                }
            }
            node if self.allow_single => nodes(vec![node]),
            _ => None,
        }
    }
}

/// The text of a string literal or a double-quoted name. Backtick quoting is
/// how StarRocks escapes a name, so those are never split.
fn reparsable_text(node: &Fragment) -> Option<&str> {
    match node {
        Fragment::Column(column) if column.name.quote_style() != Some('"') => None,
        node => node.quoted_text(),
    }
}

impl DeclarativeType for SequenceOf {
    fn describe(&self) -> String {
        format!(
            "SequenceOf({})",
            self.elements
                .types()
                .iter()
                .map(|ty| ty.describe())
                .join(" | ")
        )
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        let Some(items) = self.extract(value) else {
            return Ok(Validation::NoMatch);
        };
        let mut validated = Vec::with_capacity(items.len());
        for item in &items {
            match self.elements.validate(item)? {
                Validation::Match(v) => validated.push(v),
                Validation::NoMatch => return Ok(Validation::NoMatch),
            }
        }
        Ok(Validation::Match(Validated::Sequence(validated)))
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        match validated {
            Validated::Sequence(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.elements.normalize(item))
                    .collect();
                match self.shape {
                    SequenceShape::List => Normalized::List(items),
                    SequenceShape::Tuple => Normalized::Tuple(items),
                }
            }
            other => Normalized::from(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use sr_fragment::{ColumnRef, Ident};

    use super::*;
    use crate::types::{shared, ColumnType, IdentifierType, LiteralType, StringType};
    use crate::value::NormalizedType;

    fn columns() -> SequenceOf {
        SequenceOf::new(vec![
            shared(ColumnType::new()),
            shared(StringType::normalized_to(NormalizedType::Column)),
            shared(IdentifierType::normalized_to(NormalizedType::Column)),
        ])
        .unwrap()
        .allow_single()
        .reparse_quoted_text()
    }

    fn names(normalized: Normalized) -> Vec<String> {
        normalized
            .as_items()
            .unwrap()
            .iter()
            .map(|item| item.to_text())
            .collect()
    }

    #[test]
    fn empty_combinators_are_schema_errors() {
        assert_eq!(AnyOf::new(vec![]).unwrap_err(), SchemaError::EmptyUnion);
        assert_eq!(
            SequenceOf::new(vec![]).unwrap_err(),
            SchemaError::EmptySequence
        );
    }

    #[test]
    fn any_of_first_match_wins() {
        let literal_first = AnyOf::new(vec![
            shared(LiteralType::new()),
            shared(StringType::new()),
        ])
        .unwrap();
        let string_first = AnyOf::new(vec![
            shared(StringType::new()),
            shared(LiteralType::new()),
        ])
        .unwrap();
        let raw = RawValue::from("10");
        assert_eq!(
            literal_first.conform(&raw).unwrap(),
            Some(Normalized::Node(Fragment::number("10")))
        );
        assert_eq!(
            string_first.conform(&raw).unwrap(),
            Some(Normalized::Str("10".into()))
        );
        assert!(literal_first.accepts_plain_text());
    }

    #[test]
    fn sequence_forms() {
        let ty = columns();
        for (raw, expected) in [
            (RawValue::from("id"), vec!["id"]),
            (RawValue::from("id, dt"), vec!["id", "dt"]),
            (RawValue::from("(id, dt)"), vec!["id", "dt"]),
            (RawValue::parsed("(id)").unwrap(), vec!["id"]),
            (
                RawValue::Node(Fragment::Array(vec![
                    Fragment::column("id"),
                    Fragment::column("dt"),
                ])),
                vec!["id", "dt"],
            ),
            (RawValue::parsed("'id, dt'").unwrap(), vec!["id", "dt"]),
            (RawValue::parsed("\"id, dt\"").unwrap(), vec!["id", "dt"]),
            (RawValue::parsed("\"(id, dt)\"").unwrap(), vec!["id", "dt"]),
            (RawValue::from(vec!["id".into(), "dt".into()]), vec!["id", "dt"]),
            (RawValue::from("my col"), vec!["my col"]),
            (RawValue::parsed("'my col'").unwrap(), vec!["my col"]),
        ] {
            let expected: Vec<_> = expected.iter().map(|s| s.to_string()).collect();
            let normalized = ty.conform(&raw).unwrap();
            assert_eq!(normalized.map(names), Some(expected), "{raw}");
        }
    }

    #[test]
    fn empty_group_is_an_empty_list() {
        assert_eq!(
            columns().conform(&"()".into()).unwrap(),
            Some(Normalized::List(vec![]))
        );
    }

    #[test]
    fn quoted_names_that_do_not_parse_stay_whole() {
        let quoted = Fragment::Column(ColumnRef::new(Ident::with_quote("order id", '"')));
        assert_eq!(
            columns().conform(&RawValue::Node(quoted)).unwrap(),
            Some(Normalized::List(vec![Normalized::Node(Fragment::column(
                "order id"
            ))]))
        );
    }

    #[test]
    fn backtick_names_are_not_split() {
        let quoted = Fragment::Column(ColumnRef::new(Ident::with_quote("a, b", '`')));
        assert_eq!(
            columns().conform(&RawValue::Node(quoted.clone())).unwrap(),
            Some(Normalized::List(vec![Normalized::Node(quoted)]))
        );
        assert_eq!(
            columns()
                .conform(&RawValue::parsed("`a, b`, c").unwrap())
                .unwrap()
                .map(names),
            Some(vec!["a, b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn single_values_need_allow_single() {
        let ty = SequenceOf::new(vec![shared(ColumnType::new())]).unwrap();
        assert_eq!(ty.validate(&"id".into()).unwrap(), Validation::NoMatch);
        assert!(ty.validate(&"(id, dt)".into()).unwrap().is_match());
        // One bad element rejects the whole group.
        assert_eq!(ty.validate(&"(id, 10)".into()).unwrap(), Validation::NoMatch);
    }

    #[test]
    fn tuple_shape() {
        let ty = SequenceOf::new(vec![shared(ColumnType::new())])
            .unwrap()
            .shape(SequenceShape::Tuple);
        assert_eq!(
            ty.conform(&"(id, dt)".into()).unwrap(),
            Some(Normalized::Tuple(vec![
                Normalized::Node(Fragment::column("id")),
                Normalized::Node(Fragment::column("dt")),
            ]))
        );
    }
}
