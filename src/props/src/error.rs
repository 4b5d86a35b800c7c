// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use itertools::Itertools;

/// A malformed validator definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("AnyOf requires at least one type")]
    EmptyUnion,
    #[error("SequenceOf requires at least one element type")]
    EmptySequence,
    #[error("{tuple}: name {name:?} is used by more than one field")]
    DuplicateName { tuple: String, name: String },
}

/// A strict structured-tuple validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{tuple}: unknown field {key:?}; valid fields are {}", .valid.iter().join(", "))]
    UnknownField {
        tuple: String,
        key: String,
        valid: Vec<String>,
    },
    #[error("{tuple}: invalid value {value} for field {field:?}; expected {expected}")]
    InvalidFieldValue {
        tuple: String,
        field: String,
        value: String,
        expected: String,
    },
    #[error("{tuple}: required field {field:?} is missing")]
    MissingRequiredField { tuple: String, field: String },
    #[error("{tuple}: field {field:?} specified more than once")]
    DuplicateField { tuple: String, field: String },
}

/// A property value that no accepted form matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value} for property {property:?}; expected {expected}")]
pub struct PropertyValueError {
    pub property: String,
    pub value: String,
    /// Description of the validator the value was checked against.
    pub expected: String,
    #[source]
    pub cause: Option<ValidationError>,
}

impl PropertyValueError {
    /// Reports additional details about the error, if any are available.
    pub fn detail(&self) -> Option<String> {
        self.cause.as_ref().map(|cause| cause.to_string())
    }
}

/// Failure to derive a [`Distribution`](crate::distribution::Distribution).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributionError {
    #[error("unrecognized distribution function {name:?}; expected HASH or RANDOM")]
    UnrecognizedFunction { name: String },
    #[error("unrecognized distribution kind {name:?}; expected HASH or RANDOM")]
    UnrecognizedKind { name: String },
    #[error("invalid bucket count {value:?}: must be a positive integer")]
    InvalidBuckets { value: String },
    #[error("cannot derive a distribution from {value}")]
    UnsupportedShape { value: String },
}
