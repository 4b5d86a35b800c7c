// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The StarRocks property specification table.
//!
//! Each known property has an input type, which decides what users may
//! write, and an output type, which the normalized value must conform to.
//! Properties not in the table are generic: they end up as quoted strings in
//! the `PROPERTIES (...)` clause, so any scalar is accepted and turned into
//! text.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use sr_fragment::Fragment;
use tracing::debug;

use crate::combinators::{AnyOf, SequenceOf};
use crate::distribution::distribution_tuple_type;
use crate::error::{PropertyValueError, SchemaError};
use crate::types::{
    shared, ColumnType, DeclarativeType, EnumType, FuncType, IdentifierType, LiteralType,
    StringType, TypeRef,
};
use crate::value::{Normalized, NormalizedType, RawValue, Validation};

pub const PRIMARY_KEY: &str = "primary_key";
pub const UNIQUE_KEY: &str = "unique_key";
pub const DUPLICATE_KEY: &str = "duplicate_key";
pub const AGGREGATE_KEY: &str = "aggregate_key";
pub const PARTITIONED_BY: &str = "partitioned_by";
pub const PARTITIONS: &str = "partitions";
pub const DISTRIBUTED_BY: &str = "distributed_by";
pub const ORDER_BY: &str = "order_by";
pub const BUCKETS: &str = "buckets";

/// Alternative spellings of property names, mapped to the canonical name.
pub const PROPERTY_ALIASES: &[(&str, &str)] = &[
    ("partition_by", PARTITIONED_BY),
    ("clustered_by", ORDER_BY),
];

/// The StarRocks table models, each of which is declared by its own key
/// property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyType {
    Primary,
    Unique,
    Duplicate,
    Aggregate,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [
        KeyType::Primary,
        KeyType::Unique,
        KeyType::Duplicate,
        KeyType::Aggregate,
    ];

    pub fn property_name(&self) -> &'static str {
        match self {
            KeyType::Primary => PRIMARY_KEY,
            KeyType::Unique => UNIQUE_KEY,
            KeyType::Duplicate => DUPLICATE_KEY,
            KeyType::Aggregate => AGGREGATE_KEY,
        }
    }

    /// The clause keyword, e.g. `PRIMARY KEY`.
    pub fn keyword(&self) -> &'static str {
        match self {
            KeyType::Primary => "PRIMARY KEY",
            KeyType::Unique => "UNIQUE KEY",
            KeyType::Duplicate => "DUPLICATE KEY",
            KeyType::Aggregate => "AGGREGATE KEY",
        }
    }

    pub fn from_property(name: &str) -> Option<KeyType> {
        KeyType::ALL
            .into_iter()
            .find(|key| key.property_name() == name)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The input and output types of one property.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    input: TypeRef,
    output: TypeRef,
    /// A strict type run ahead of the input type on structured values.
    diagnostic: Option<TypeRef>,
}

impl PropertySpec {
    pub fn new(input: TypeRef, output: TypeRef) -> Self {
        PropertySpec {
            input,
            output,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: TypeRef) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn input(&self) -> &dyn DeclarativeType {
        &*self.input
    }

    pub fn output(&self) -> &dyn DeclarativeType {
        &*self.output
    }
}

/// Maps property names to their specifications.
#[derive(Debug)]
pub struct PropertySpecs {
    specs: BTreeMap<&'static str, PropertySpec>,
    generic: PropertySpec,
}

/// The specifications of the StarRocks physical properties.
pub static STARROCKS_PROPERTIES: LazyLock<PropertySpecs> = LazyLock::new(|| {
    PropertySpecs::starrocks().expect("StarRocks property specifications are well formed")
});

impl PropertySpecs {
    /// Builds the StarRocks table.
    pub fn starrocks() -> Result<PropertySpecs, SchemaError> {
        let column_list = || -> Result<TypeRef, SchemaError> {
            Ok(shared(
                SequenceOf::new(vec![
                    shared(ColumnType::new()),
                    shared(StringType::normalized_to(NormalizedType::Column)),
                    shared(IdentifierType::normalized_to(NormalizedType::Column)),
                ])?
                .allow_single()
                .reparse_quoted_text(),
            ))
        };
        let column_list_output = shared(SequenceOf::new(vec![shared(ColumnType::new())])?);
        let key = PropertySpec::new(column_list()?, column_list_output);

        let partitioned_by = PropertySpec::new(
            shared(
                SequenceOf::new(vec![
                    shared(ColumnType::new()),
                    shared(StringType::normalized_to(NormalizedType::Column)),
                    shared(IdentifierType::normalized_to(NormalizedType::Column)),
                    shared(FuncType),
                ])?
                .allow_single()
                .reparse_quoted_text(),
            ),
            shared(SequenceOf::new(vec![
                shared(ColumnType::new()),
                shared(FuncType),
            ])?),
        );

        let partitions_type = shared(
            SequenceOf::new(vec![
                shared(StringType::new()),
                shared(LiteralType::normalized_to(NormalizedType::Str)),
            ])?
            .allow_single(),
        );
        let partitions = PropertySpec::new(Arc::clone(&partitions_type), partitions_type);

        let distributed_by_type = shared(AnyOf::new(vec![
            shared(distribution_tuple_type()?.probing()),
            shared(EnumType::new(["RANDOM"])),
            shared(FuncType),
        ])?);
        let distributed_by =
            PropertySpec::new(Arc::clone(&distributed_by_type), distributed_by_type)
                .with_diagnostic(shared(distribution_tuple_type()?));

        let buckets = PropertySpec::new(
            shared(AnyOf::new(vec![
                shared(LiteralType::normalized_to(NormalizedType::Str)),
                shared(StringType::new()),
            ])?),
            shared(StringType::new()),
        );

        let generic = PropertySpec::new(
            shared(AnyOf::new(vec![
                shared(StringType::new()),
                shared(LiteralType::normalized_to(NormalizedType::Str)),
                shared(IdentifierType::normalized_to(NormalizedType::Str)),
                shared(ColumnType::normalized_to(NormalizedType::Str)),
            ])?),
            shared(StringType::new()),
        );

        let order_by = PropertySpec::new(column_list()?, Arc::clone(&key.output));

        let mut specs = BTreeMap::new();
        for key_type in KeyType::ALL {
            specs.insert(key_type.property_name(), key.clone());
        }
        specs.insert(PARTITIONED_BY, partitioned_by);
        specs.insert(PARTITIONS, partitions);
        specs.insert(DISTRIBUTED_BY, distributed_by);
        specs.insert(ORDER_BY, order_by);
        specs.insert(BUCKETS, buckets);

        Ok(PropertySpecs { specs, generic })
    }

    /// Lowercases `name` and resolves aliases.
    pub fn canonical_name(name: &str) -> String {
        let name = name.to_lowercase();
        PROPERTY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(name)
    }

    /// Whether `name` has its own specification.
    pub fn is_known(&self, name: &str) -> bool {
        self.specs.contains_key(PropertySpecs::canonical_name(name).as_str())
    }

    /// The specification of `name`, or the generic one.
    pub fn spec(&self, name: &str) -> &PropertySpec {
        self.specs
            .get(PropertySpecs::canonical_name(name).as_str())
            .unwrap_or(&self.generic)
    }

    pub fn input_type(&self, name: &str) -> &dyn DeclarativeType {
        self.spec(name).input()
    }

    pub fn output_type(&self, name: &str) -> &dyn DeclarativeType {
        self.spec(name).output()
    }

    /// Validates `raw` against the input type of `name` and normalizes it.
    pub fn validate_and_normalize(
        &self,
        name: &str,
        raw: &RawValue,
    ) -> Result<Normalized, PropertyValueError> {
        let spec = self.spec(name);
        let err = |cause| PropertyValueError {
            property: name.to_string(),
            value: raw.to_string(),
            expected: spec.input.describe(),
            cause,
        };
        // Structured values are checked strictly first, so that a misspelled
        // field is reported instead of being skipped by the probing tuple.
        if let Some(diagnostic) = &spec.diagnostic {
            if has_pairs(raw) {
                diagnostic.validate(raw).map_err(|cause| err(Some(cause)))?;
            }
        }
        match spec.input.validate(raw) {
            Ok(Validation::Match(validated)) => {
                let normalized = spec.input.normalize(validated);
                debug!(property = name, %normalized, "normalized property");
                Ok(normalized)
            }
            Ok(Validation::NoMatch) => Err(err(None)),
            Err(cause) => Err(err(Some(cause))),
        }
    }

    /// Checks that a normalized value conforms to the output type of `name`.
    pub fn check_output(
        &self,
        name: &str,
        normalized: &Normalized,
    ) -> Result<(), PropertyValueError> {
        let spec = self.spec(name);
        let raw = RawValue::from(normalized.clone());
        let err = |cause| PropertyValueError {
            property: name.to_string(),
            value: normalized.to_string(),
            expected: spec.output.describe(),
            cause,
        };
        match spec.output.validate(&raw) {
            Ok(Validation::Match(_)) => Ok(()),
            Ok(Validation::NoMatch) => Err(err(None)),
            Err(cause) => Err(err(Some(cause))),
        }
    }
}

/// Whether `raw` is a group containing `key = value` pairs.
fn has_pairs(raw: &RawValue) -> bool {
    let is_pair = |node: &Fragment| matches!(node, Fragment::Eq(_, _));
    match raw.to_fragment().as_deref() {
        Some(Fragment::Tuple(items)) => items.iter().any(is_pair),
        Some(Fragment::Paren(inner)) => match &**inner {
            Fragment::Tuple(items) => items.iter().any(is_pair),
            inner => is_pair(inner),
        },
        Some(node) => is_pair(node),
        None => false,
    }
}
