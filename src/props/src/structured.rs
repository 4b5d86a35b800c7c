// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Structured tuples: groups of `key = value` pairs with a declared schema.

use std::collections::BTreeMap;

use sr_fragment::Fragment;

use crate::error::{SchemaError, ValidationError};
use crate::types::{DeclarativeType, EqType, TypeRef};
use crate::value::{Normalized, RawValue, Validated, Validation};

/// One named slot of a structured tuple.
#[derive(Debug, Clone)]
pub struct Field {
    ty: TypeRef,
    required: bool,
    aliases: Vec<String>,
    doc: Option<String>,
}

impl Field {
    pub fn new(ty: TypeRef) -> Self {
        Field {
            ty,
            required: false,
            aliases: vec![],
            doc: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

/// Accepts a parenthesized group of `key = value` pairs, e.g.
/// `(kind = 'HASH', buckets = 10)`, validating each value against the field
/// it names.
///
/// A strict tuple reports unknown keys, invalid values and missing required
/// fields as errors. A probing tuple, as used inside [`AnyOf`], skips unknown
/// keys and reports the other failures as a mismatch so the union can try its
/// next alternative.
///
/// [`AnyOf`]: crate::combinators::AnyOf
#[derive(Debug, Clone)]
pub struct StructuredTupleType {
    name: String,
    fields: Vec<(String, Field)>,
    /// Canonical names and aliases, mapped to their index in `fields`.
    lookup: BTreeMap<String, usize>,
    error_on_unknown_field: bool,
    error_on_invalid_field: bool,
}

impl StructuredTupleType {
    /// Creates a strict structured tuple. Fields keep their declaration order.
    pub fn new(name: &str, fields: Vec<(&str, Field)>) -> Result<Self, SchemaError> {
        let mut lookup = BTreeMap::new();
        for (index, (field_name, field)) in fields.iter().enumerate() {
            let names =
                std::iter::once(*field_name).chain(field.aliases.iter().map(String::as_str));
            for key in names {
                if lookup.insert(key.to_string(), index).is_some() {
                    return Err(SchemaError::DuplicateName {
                        tuple: name.to_string(),
                        name: key.to_string(),
                    });
                }
            }
        }
        Ok(StructuredTupleType {
            name: name.to_string(),
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.to_string(), field))
                .collect(),
            lookup,
            error_on_unknown_field: true,
            error_on_invalid_field: true,
        })
    }

    /// Turns off both kinds of errors.
    pub fn probing(self) -> Self {
        self.error_on_unknown_field(false)
            .error_on_invalid_field(false)
    }

    pub fn error_on_unknown_field(mut self, yes: bool) -> Self {
        self.error_on_unknown_field = yes;
        self
    }

    pub fn error_on_invalid_field(mut self, yes: bool) -> Self {
        self.error_on_invalid_field = yes;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.error_on_unknown_field || self.error_on_invalid_field
    }

    /// The canonical field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Looks up a field by canonical name or alias.
    pub fn field(&self, name: &str) -> Option<(&str, &Field)> {
        let index = *self.lookup.get(name)?;
        let (canonical, field) = &self.fields[index];
        Some((canonical.as_str(), field))
    }

    /// The direct children of a group. Only groups and bare pairs qualify.
    fn children(value: &RawValue) -> Option<Vec<RawValue>> {
        if let RawValue::List(items) = value {
            return Some(items.clone());
        }
        let nodes = |items: &[Fragment]| -> Vec<RawValue> {
            items.iter().cloned().map(RawValue::Node).collect()
        };
        match &*value.to_fragment()? {
            Fragment::Tuple(items) => Some(nodes(items)),
            Fragment::Paren(inner) => match &**inner {
                Fragment::Tuple(items) => Some(nodes(items)),
                inner => Some(vec![RawValue::Node(inner.clone())]),
            },
            pair @ Fragment::Eq(_, _) => Some(vec![RawValue::Node(pair.clone())]),
            _ => None,
        }
    }

    /// Reports a field-level failure, or a mismatch when probing.
    fn invalid(&self, err: ValidationError) -> Result<Validation, ValidationError> {
        if self.error_on_invalid_field {
            Err(err)
        } else {
            Ok(Validation::NoMatch)
        }
    }
}

impl DeclarativeType for StructuredTupleType {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn validate(&self, value: &RawValue) -> Result<Validation, ValidationError> {
        let Some(children) = StructuredTupleType::children(value) else {
            return Ok(Validation::NoMatch);
        };

        let mut fields = BTreeMap::new();
        for child in &children {
            let Some((key, rhs)) = child.to_fragment().and_then(|node| EqType::split(&node))
            else {
                continue;
            };
            let Some((canonical, field)) = self.field(&key) else {
                if self.error_on_unknown_field {
                    return Err(ValidationError::UnknownField {
                        tuple: self.name.clone(),
                        key,
                        valid: self.field_names().map(String::from).collect(),
                    });
                }
                continue;
            };
            if fields.contains_key(canonical) {
                return self.invalid(ValidationError::DuplicateField {
                    tuple: self.name.clone(),
                    field: canonical.to_string(),
                });
            }
            let raw = RawValue::Node(rhs);
            match field.ty.validate(&raw)? {
                Validation::Match(validated) => {
                    fields.insert(canonical.to_string(), validated);
                }
                Validation::NoMatch => {
                    return self.invalid(ValidationError::InvalidFieldValue {
                        tuple: self.name.clone(),
                        field: canonical.to_string(),
                        value: raw.to_string(),
                        expected: field.ty.describe(),
                    });
                }
            }
        }

        for (name, field) in &self.fields {
            if field.required && !fields.contains_key(name) {
                return self.invalid(ValidationError::MissingRequiredField {
                    tuple: self.name.clone(),
                    field: name.clone(),
                });
            }
        }

        Ok(Validation::Match(Validated::Fields(fields)))
    }

    fn normalize(&self, validated: Validated) -> Normalized {
        match validated {
            Validated::Fields(fields) => Normalized::Map(
                fields
                    .into_iter()
                    .map(|(name, value)| {
                        let normalized = match self.field(&name) {
                            Some((_, field)) => field.ty.normalize(value),
                            None => Normalized::from(value),
                        };
                        (name, normalized)
                    })
                    .collect(),
            ),
            other => Normalized::from(other),
        }
    }
}
