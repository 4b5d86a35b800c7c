// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Primitive declarative types.
//!
//! Each type answers one question about a raw value ("is this a column?",
//! "is this one of these keywords?") and, if the answer is yes, knows how to
//! turn the value into its canonical form. Text is parsed by every type
//! independently, so the same string can be offered to several candidates.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use sr_fragment::ast::display::AstDisplay;
use sr_fragment::{parse_fragment, Fragment, Literal};

use crate::error::ValidationError;
use crate::value::{convert, text_of, Normalized, NormalizedType, RawValue, Validated, Validation};

/// A shared, type-erased declarative type.
pub type TypeRef = Arc<dyn DeclarativeType>;

/// A validator and normalizer for one kind of property value.
pub trait DeclarativeType: fmt::Debug + Send + Sync {
    /// Describes the accepted values, for error messages.
    fn describe(&self) -> String;

    /// Checks whether `value` has this type's shape.
    ///
    /// A mismatch is reported as [`Validation::NoMatch`]. Errors are reserved
    /// for strict structured tuples, which reject values loudly instead.
    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError>;

    /// Converts a value previously accepted by [`DeclarativeType::validate`]
    /// to its canonical form.
    fn normalize(&self, validated: Validated) -> Normalized {
        Normalized::from(validated)
    }

    /// Whether the type accepts text that does not parse as an expression.
    fn accepts_plain_text(&self) -> bool {
        false
    }

    /// The alternatives of a union type, in the order they are tried.
    fn alternatives(&self) -> Option<&[TypeRef]> {
        None
    }

    /// Validates and normalizes `value` in one step.
    fn conform(&self, value: &RawValue) -> Result<Option<Normalized>, ValidationError> {
        Ok(self
            .validate(value)?
            .into_validated()
            .map(|validated| self.normalize(validated)))
    }
}

/// Wraps a declarative type for use inside combinators.
pub fn shared<T: DeclarativeType + 'static>(ty: T) -> TypeRef {
    Arc::new(ty)
}

fn validate_node(value: &RawValue, accept: impl Fn(&Fragment) -> bool) -> Validation {
    match value.to_fragment() {
        Some(node) if accept(&node) => Validation::Match(Validated::Node(node.into_owned())),
        _ => Validation::NoMatch,
    }
}

fn normalize_node(validated: Validated, target: Option<NormalizedType>) -> Normalized {
    match (validated, target) {
        (Validated::Node(node), Some(target)) => convert(node, target),
        (validated, _) => Normalized::from(validated),
    }
}

fn describe_target(name: &str, target: Option<NormalizedType>) -> String {
    match target {
        Some(target) => format!("{}->{}", name, target),
        None => name.to_string(),
    }
}

/// Accepts native text only.
#[derive(Debug, Clone, Default)]
pub struct StringType {
    target: Option<NormalizedType>,
}

impl StringType {
    pub fn new() -> Self {
        StringType::default()
    }

    pub fn normalized_to(target: NormalizedType) -> Self {
        StringType {
            target: Some(target),
        }
    }
}

impl DeclarativeType for StringType {
    fn describe(&self) -> String {
        describe_target("String", self.target)
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        Ok(match value {
            RawValue::Text(text) => Validation::Match(Validated::Str(text.clone())),
            _ => Validation::NoMatch,
        })
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        match (validated, self.target) {
            (Validated::Str(text), Some(target)) if target != NormalizedType::Str => {
                convert(Fragment::string(text), target)
            }
            (validated, _) => Normalized::from(validated),
        }
    }

    fn accepts_plain_text(&self) -> bool {
        true
    }
}

/// Accepts literals: quoted strings, numbers, booleans and `NULL`.
#[derive(Debug, Clone, Default)]
pub struct LiteralType {
    target: Option<NormalizedType>,
}

impl LiteralType {
    pub fn new() -> Self {
        LiteralType::default()
    }

    pub fn normalized_to(target: NormalizedType) -> Self {
        LiteralType {
            target: Some(target),
        }
    }
}

impl DeclarativeType for LiteralType {
    fn describe(&self) -> String {
        describe_target("Literal", self.target)
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        Ok(validate_node(value, |node| {
            matches!(node, Fragment::Literal(_))
        }))
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        normalize_node(validated, self.target)
    }
}

/// Accepts identifier nodes.
///
/// The parser reads bare names as columns, so identifiers only arrive as
/// nodes built by the model loader.
#[derive(Debug, Clone, Default)]
pub struct IdentifierType {
    target: Option<NormalizedType>,
}

impl IdentifierType {
    pub fn new() -> Self {
        IdentifierType::default()
    }

    pub fn normalized_to(target: NormalizedType) -> Self {
        IdentifierType {
            target: Some(target),
        }
    }
}

impl DeclarativeType for IdentifierType {
    fn describe(&self) -> String {
        describe_target("Identifier", self.target)
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        Ok(validate_node(value, |node| {
            matches!(node, Fragment::Identifier(_))
        }))
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        normalize_node(validated, self.target)
    }
}

/// Accepts column references.
#[derive(Debug, Clone, Default)]
pub struct ColumnType {
    target: Option<NormalizedType>,
}

impl ColumnType {
    pub fn new() -> Self {
        ColumnType::default()
    }

    pub fn normalized_to(target: NormalizedType) -> Self {
        ColumnType {
            target: Some(target),
        }
    }
}

impl DeclarativeType for ColumnType {
    fn describe(&self) -> String {
        describe_target("Column", self.target)
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        Ok(validate_node(value, |node| matches!(node, Fragment::Column(_))))
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        normalize_node(validated, self.target)
    }
}

/// Accepts `key = value` pairs.
#[derive(Debug, Clone, Default)]
pub struct EqType;

impl EqType {
    /// Splits a pair into the name of its left operand and its right operand.
    pub fn split(node: &Fragment) -> Option<(String, Fragment)> {
        let Fragment::Eq(left, right) = node else {
            return None;
        };
        let key = match &**left {
            Fragment::Column(column) => column.name().to_string(),
            Fragment::Identifier(ident) => ident.as_str().to_string(),
            Fragment::Literal(Literal::String(s)) => s.clone(),
            other => other.to_ast_string_simple(),
        };
        Some((key, (**right).clone()))
    }
}

impl DeclarativeType for EqType {
    fn describe(&self) -> String {
        "Eq".into()
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        let split = value.to_fragment().and_then(|node| EqType::split(&node));
        Ok(split
            .map(|(key, value)| Validated::Pair(key, value))
            .into())
    }
}

/// Accepts function calls, whether or not the function is a known builtin.
#[derive(Debug, Clone, Default)]
pub struct FuncType;

impl DeclarativeType for FuncType {
    fn describe(&self) -> String {
        "Func".into()
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        Ok(validate_node(value, |node| {
            matches!(node, Fragment::Function(_))
        }))
    }
}

/// Accepts one of a fixed set of keywords.
///
/// Validation yields the keyword as it is spelled in the allowed set, so
/// `random`, `'Random'` and `RANDOM` all become `RANDOM` when the set
/// contains `RANDOM`.
#[derive(Debug, Clone)]
pub struct EnumType {
    values: Vec<String>,
    case_sensitive: bool,
    target: NormalizedType,
}

impl EnumType {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumType {
            values: values.into_iter().map(Into::into).collect(),
            case_sensitive: false,
            target: NormalizedType::Str,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn normalized_to(mut self, target: NormalizedType) -> Self {
        self.target = target;
        self
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Extracts the text to compare against the allowed values.
    fn comparable_text(value: &RawValue) -> Option<String> {
        fn named(node: &Fragment) -> Option<String> {
            match node {
                Fragment::Identifier(_) | Fragment::Column(_) | Fragment::Literal(_) => {
                    Some(text_of(node).into_owned())
                }
                _ => None,
            }
        }

        match value {
            RawValue::Text(text) => match parse_fragment(text) {
                Ok(node) => Some(named(&node).unwrap_or_else(|| text.clone())),
                Err(_) => Some(text.clone()),
            },
            RawValue::Node(node) => named(node),
            RawValue::List(_) => None,
        }
    }
}

impl DeclarativeType for EnumType {
    fn describe(&self) -> String {
        format!("Enum({})", self.values.iter().join(", "))
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        let Some(text) = EnumType::comparable_text(value) else {
            return Ok(Validation::NoMatch);
        };
        let canonical = self.values.iter().find(|allowed| {
            if self.case_sensitive {
                **allowed == text
            } else {
                allowed.to_uppercase() == text.to_uppercase()
            }
        });
        Ok(canonical.map(|c| Validated::Str(c.clone())).into())
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        match validated {
            Validated::Str(value) => match self.target {
                NormalizedType::Str => Normalized::Str(value),
                NormalizedType::Expr => Normalized::Node(Fragment::identifier(value)),
                target => convert(Fragment::identifier(value), target),
            },
            other => Normalized::from(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use sr_fragment::{ColumnRef, Ident};

    use super::*;

    fn node(text: &str) -> RawValue {
        RawValue::parsed(text).unwrap()
    }

    #[test]
    fn string_type_only_accepts_text() {
        let ty = StringType::new();
        assert_eq!(
            ty.conform(&"anything goes".into()).unwrap(),
            Some(Normalized::Str("anything goes".into()))
        );
        assert_eq!(ty.conform(&node("'quoted'")).unwrap(), None);

        let ty = StringType::normalized_to(NormalizedType::Column);
        assert_eq!(
            ty.conform(&"my col".into()).unwrap(),
            Some(Normalized::Node(Fragment::column("my col")))
        );
    }

    #[test]
    fn literal_type() {
        let ty = LiteralType::new();
        assert_eq!(
            ty.conform(&"10".into()).unwrap(),
            Some(Normalized::Node(Fragment::number("10")))
        );
        assert_eq!(ty.conform(&"id".into()).unwrap(), None);

        let ty = LiteralType::normalized_to(NormalizedType::Str);
        assert_eq!(
            ty.conform(&node("'3'")).unwrap(),
            Some(Normalized::Str("3".into()))
        );
    }

    #[test]
    fn identifier_and_column_types() {
        let identifier = RawValue::Node(Fragment::identifier("id"));
        assert!(ColumnType::new().validate(&identifier).unwrap() == Validation::NoMatch);
        assert_eq!(
            IdentifierType::normalized_to(NormalizedType::Column)
                .conform(&identifier)
                .unwrap(),
            Some(Normalized::Node(Fragment::column("id")))
        );
        // Parsed text never yields identifiers.
        assert_eq!(IdentifierType::new().conform(&"id".into()).unwrap(), None);

        let quoted = node("`order id`");
        assert_eq!(
            ColumnType::normalized_to(NormalizedType::Str)
                .conform(&quoted)
                .unwrap(),
            Some(Normalized::Str("order id".into()))
        );
        assert_eq!(
            ColumnType::new().conform(&quoted).unwrap(),
            Some(Normalized::Node(Fragment::Column(ColumnRef::new(
                Ident::with_quote("order id", '`')
            ))))
        );
    }

    #[test]
    fn eq_type() {
        let ty = EqType;
        assert_eq!(
            ty.validate(&"kind='HASH'".into()).unwrap(),
            Validation::Match(Validated::Pair("kind".into(), Fragment::string("HASH")))
        );
        assert_eq!(
            ty.validate(&"\"buckets\" = 10".into()).unwrap(),
            Validation::Match(Validated::Pair("buckets".into(), Fragment::number("10")))
        );
        assert_eq!(ty.validate(&"kind".into()).unwrap(), Validation::NoMatch);
    }

    #[test]
    fn func_type_accepts_any_function() {
        let ty = FuncType;
        assert!(ty.validate(&"RANGE(col1, col2)".into()).unwrap().is_match());
        assert!(ty.validate(&"date_trunc('day', dt)".into()).unwrap().is_match());
        assert!(!ty.validate(&"RANDOM".into()).unwrap().is_match());
        assert!(!ty.validate(&"HASH(id) BUCKETS 10".into()).unwrap().is_match());
    }

    #[test]
    fn enum_type() {
        let ty = EnumType::new(["HASH", "RANDOM"]);
        for raw in [
            RawValue::from("random"),
            RawValue::from("'Random'"),
            node("RANDOM"),
            node("\"random\""),
            RawValue::Node(Fragment::identifier("Random")),
        ] {
            assert_eq!(
                ty.conform(&raw).unwrap(),
                Some(Normalized::Str("RANDOM".into())),
                "{raw}"
            );
        }
        assert_eq!(ty.conform(&"HASH(id)".into()).unwrap(), None);
        assert_eq!(ty.conform(&node("(kind='RANDOM')")).unwrap(), None);

        let ty = EnumType::new(["HASH"]).case_sensitive(true);
        assert_eq!(ty.conform(&"hash".into()).unwrap(), None);
        assert_eq!(
            ty.conform(&"HASH".into()).unwrap(),
            Some(Normalized::Str("HASH".into()))
        );

        let ty = EnumType::new(["HASH"]).normalized_to(NormalizedType::Literal);
        assert_eq!(
            ty.conform(&"hash".into()).unwrap(),
            Some(Normalized::Node(Fragment::string("HASH")))
        );
    }
}
