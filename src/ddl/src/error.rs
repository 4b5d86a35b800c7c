// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sr_props::spec::KeyType;
use sr_props::{DistributionError, PropertyValueError};

/// Logical errors detectable while building StarRocks DDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DdlError {
    #[error("multiple key types defined: {}; only one key type is allowed per table", .properties.join(", "))]
    ConflictingKeyTypes { properties: Vec<String> },
    #[error("{key} columns {} not found in table columns", .missing.join(", "))]
    MissingKeyColumns {
        key: KeyType,
        missing: Vec<String>,
        available: Vec<String>,
    },
    #[error(transparent)]
    Property(#[from] PropertyValueError),
    #[error("property {property:?}: {source}")]
    Distribution {
        property: String,
        #[source]
        source: DistributionError,
    },
    #[error("property {name:?} specified more than once")]
    DuplicateProperty { name: String, spellings: Vec<String> },
    #[error("{key} column {value} is not a column name")]
    InvalidKeyColumn { key: KeyType, value: String },
    #[error("partitions require RANGE or LIST partitioning")]
    PartitionsRequireRangeOrList,
    #[error("invalid partition specification {spec}")]
    InvalidPartitionSpec { spec: String },
    #[error("bucket count specified both as {suffix} and as {property}")]
    ConflictingBuckets { suffix: u32, property: u32 },
    #[error("buckets specified without distributed_by")]
    BucketsWithoutDistribution,
    #[error("HASH distribution requires at least one column")]
    HashWithoutColumns,
}

impl DdlError {
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::MissingKeyColumns { available, .. } => Some(format!(
                "available columns: {}",
                itertools::join(available, ", ")
            )),
            Self::Property(e) => e.detail(),
            Self::DuplicateProperty { spellings, .. } => {
                Some(format!("spelled as: {}", spellings.join(", ")))
            }
            Self::InvalidPartitionSpec { .. } => {
                Some("RANGE and LIST must be the only partition expression".into())
            }
            _ => None,
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConflictingKeyTypes { .. } => Some(
                "Choose one of primary_key, unique_key, duplicate_key or aggregate_key.".into(),
            ),
            Self::PartitionsRequireRangeOrList => Some(
                "Set partitioned_by to RANGE(...) or LIST(...), or remove partitions.".into(),
            ),
            Self::ConflictingBuckets { .. } => {
                Some("Remove either the BUCKETS suffix or the buckets property.".into())
            }
            Self::BucketsWithoutDistribution => {
                Some("Set distributed_by, e.g. distributed_by = RANDOM.".into())
            }
            Self::HashWithoutColumns => Some("Use HASH(col, ...) or set columns.".into()),
            _ => None,
        }
    }
}
