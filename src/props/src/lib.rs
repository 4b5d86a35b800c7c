// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declarative validation and normalization of StarRocks physical properties.
//!
//! Model definitions describe a table's physical layout through loosely typed
//! properties: `primary_key = "id, dt"`, `distributed_by = "HASH(id)"`,
//! `distributed_by = (kind = 'RANDOM', buckets = 8)` and so on. This crate
//! decides which spellings each property accepts and reduces all of them to
//! one canonical [`Normalized`](value::Normalized) value.
//!
//! Validators are built from a handful of primitive [`types`] composed with
//! the [`combinators`] and [`structured`] tuples. The StarRocks table of
//! property validators lives in [`spec`].

pub mod combinators;
pub mod distribution;
pub mod error;
pub mod spec;
pub mod structured;
pub mod types;
pub mod value;

pub use distribution::{Distribution, DistributionKind};
pub use error::{DistributionError, PropertyValueError, SchemaError, ValidationError};
pub use spec::{KeyType, PropertySpecs, STARROCKS_PROPERTIES};
pub use value::{Normalized, RawValue};
