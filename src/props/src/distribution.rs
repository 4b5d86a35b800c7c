// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Table distribution.
//!
//! StarRocks distributes rows across buckets either by hashing a list of
//! columns or at random. Users can spell this as a structured tuple
//! (`(kind='HASH', columns=(id, dt), buckets=10)`), as the bare keyword
//! `RANDOM`, or as a call (`HASH(id, dt)`). All three are unified into one
//! [`Distribution`].

use std::collections::BTreeMap;
use std::fmt;

use sr_fragment::Fragment;
use tracing::warn;

use crate::combinators::{AnyOf, SequenceOf};
use crate::error::{DistributionError, SchemaError};
use crate::structured::{Field, StructuredTupleType};
use crate::types::{shared, ColumnType, EnumType, IdentifierType, LiteralType, StringType};
use crate::value::{text_of, Normalized, NormalizedType};

/// The name of the distribution structured tuple, used in error messages.
pub const DISTRIBUTION_TUPLE: &str = "DistributionTuple";

/// Builds the strict structured tuple accepted by `distributed_by`.
///
/// Fields:
///  * `kind`: `HASH` or `RANDOM`, required.
///  * `columns` (alias `expressions`): one or more columns.
///  * `buckets` (aliases `bucket`, `bucket_num`): the bucket count.
pub fn distribution_tuple_type() -> Result<StructuredTupleType, SchemaError> {
    let kind = EnumType::new(DistributionKind::ALL.iter().map(|kind| kind.as_str()));
    let columns = SequenceOf::new(vec![
        shared(ColumnType::new()),
        shared(IdentifierType::normalized_to(NormalizedType::Column)),
    ])?
    .allow_single()
    .reparse_quoted_text();
    let buckets = AnyOf::new(vec![shared(LiteralType::new()), shared(StringType::new())])?;

    StructuredTupleType::new(
        DISTRIBUTION_TUPLE,
        vec![
            (
                "kind",
                Field::new(shared(kind))
                    .required()
                    .doc("Distribution strategy"),
            ),
            (
                "columns",
                Field::new(shared(columns))
                    .alias("expressions")
                    .doc("Columns to hash"),
            ),
            (
                "buckets",
                Field::new(shared(buckets))
                    .alias("bucket")
                    .alias("bucket_num")
                    .doc("Number of buckets"),
            ),
        ],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistributionKind {
    Hash,
    Random,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 2] = [DistributionKind::Hash, DistributionKind::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Hash => "HASH",
            DistributionKind::Random => "RANDOM",
        }
    }

    /// Looks up a kind by name, ignoring case.
    pub fn from_name(name: &str) -> Option<DistributionKind> {
        DistributionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unified distribution specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub kind: DistributionKind,
    /// Hashed expressions; always empty for random distribution.
    pub columns: Vec<Fragment>,
    pub buckets: Option<u32>,
}

impl Distribution {
    /// Unifies the normalized value of `distributed_by`.
    ///
    /// `buckets` is a bucket count supplied separately from the value, e.g.
    /// by a `BUCKETS n` suffix. It applies to the keyword and call forms, and
    /// to structured tuples that do not name their own bucket count.
    pub fn unify(
        normalized: &Normalized,
        buckets: Option<u32>,
    ) -> Result<Distribution, DistributionError> {
        match normalized {
            Normalized::Str(kind) => Distribution::from_enum(kind, buckets),
            Normalized::Node(Fragment::Function(func)) => {
                Distribution::from_func(&func.name, &func.args, buckets)
            }
            Normalized::Map(fields) => Distribution::from_fields(fields, buckets),
            other => Err(DistributionError::UnsupportedShape {
                value: other.to_string(),
            }),
        }
    }

    pub fn from_enum(kind: &str, buckets: Option<u32>) -> Result<Distribution, DistributionError> {
        let kind = DistributionKind::from_name(kind).ok_or_else(|| {
            DistributionError::UnrecognizedKind {
                name: kind.to_string(),
            }
        })?;
        Ok(Distribution {
            kind,
            columns: vec![],
            buckets,
        })
    }

    pub fn from_func(
        name: &str,
        args: &[Fragment],
        buckets: Option<u32>,
    ) -> Result<Distribution, DistributionError> {
        match DistributionKind::from_name(name) {
            Some(DistributionKind::Hash) => Ok(Distribution {
                kind: DistributionKind::Hash,
                columns: args.to_vec(),
                buckets,
            }),
            Some(DistributionKind::Random) => Ok(Distribution {
                kind: DistributionKind::Random,
                columns: vec![],
                buckets,
            }),
            None => Err(DistributionError::UnrecognizedFunction {
                name: name.to_string(),
            }),
        }
    }

    fn from_fields(
        fields: &BTreeMap<String, Normalized>,
        buckets: Option<u32>,
    ) -> Result<Distribution, DistributionError> {
        let kind = match fields.get("kind") {
            Some(kind) => kind.to_text(),
            None => {
                return Err(DistributionError::UnsupportedShape {
                    value: Normalized::Map(fields.clone()).to_string(),
                })
            }
        };
        let mut distribution = Distribution::from_enum(&kind, None)?;
        if distribution.kind == DistributionKind::Hash {
            distribution.columns = match fields.get("columns") {
                Some(Normalized::List(items) | Normalized::Tuple(items)) => {
                    items.iter().map(Normalized::to_fragment).collect()
                }
                Some(other) => vec![other.to_fragment()],
                None => vec![],
            };
        }
        distribution.buckets = match (fields.get("buckets"), buckets) {
            (Some(own), Some(separate)) => {
                let own = parse_buckets(own)?;
                if own != separate {
                    warn!(
                        buckets = own,
                        ignored = separate,
                        "distribution tuple names its own bucket count"
                    );
                }
                Some(own)
            }
            (Some(own), None) => Some(parse_buckets(own)?),
            (None, separate) => separate,
        };
        Ok(distribution)
    }
}

/// Parses a normalized bucket count: a numeric literal or a numeric string.
pub fn parse_buckets(value: &Normalized) -> Result<u32, DistributionError> {
    let text = match value {
        Normalized::Str(s) => s.clone(),
        Normalized::Node(node @ Fragment::Literal(_)) => text_of(node).into_owned(),
        other => other.to_string(),
    };
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DistributionError::InvalidBuckets { value: text }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeclarativeType;
    use crate::value::RawValue;

    fn tuple(text: &str) -> Normalized {
        distribution_tuple_type()
            .unwrap()
            .conform(&text.into())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn structured_forms() {
        let expected = Distribution {
            kind: DistributionKind::Hash,
            columns: vec![Fragment::column("id"), Fragment::column("dt")],
            buckets: Some(10),
        };
        for text in [
            "(kind='HASH', columns=(id, dt), buckets=10)",
            "(kind=hash, expressions=(id, dt), bucket_num='10')",
            "(kind='HASH', columns='id, dt', bucket=10)",
        ] {
            assert_eq!(
                Distribution::unify(&tuple(text), None),
                Ok(expected.clone()),
                "{text}"
            );
        }
    }

    #[test]
    fn keyword_and_call_forms() {
        assert_eq!(
            Distribution::unify(&Normalized::Str("RANDOM".into()), None),
            Ok(Distribution {
                kind: DistributionKind::Random,
                columns: vec![],
                buckets: None,
            })
        );
        let call = RawValue::parsed("HASH(id)").unwrap();
        let RawValue::Node(call) = call else {
            unreachable!()
        };
        assert_eq!(
            Distribution::unify(&Normalized::Node(call), Some(8)),
            Ok(Distribution {
                kind: DistributionKind::Hash,
                columns: vec![Fragment::column("id")],
                buckets: Some(8),
            })
        );
    }

    #[test]
    fn unrecognized_functions() {
        let RawValue::Node(call) = RawValue::parsed("ROUND_ROBIN(id)").unwrap() else {
            unreachable!()
        };
        assert_eq!(
            Distribution::unify(&Normalized::Node(call), None),
            Err(DistributionError::UnrecognizedFunction {
                name: "ROUND_ROBIN".into()
            })
        );
    }

    #[test]
    fn bucket_precedence() {
        let own = tuple("(kind='RANDOM', buckets=4)");
        assert_eq!(Distribution::unify(&own, Some(16)).unwrap().buckets, Some(4));
        let none = tuple("(kind='RANDOM')");
        assert_eq!(Distribution::unify(&none, Some(16)).unwrap().buckets, Some(16));
        assert_eq!(Distribution::unify(&none, None).unwrap().buckets, None);
    }

    #[test]
    fn random_ignores_columns() {
        let normalized = tuple("(kind='RANDOM', columns=(id))");
        assert!(Distribution::unify(&normalized, None)
            .unwrap()
            .columns
            .is_empty());
    }

    #[test]
    fn invalid_buckets() {
        for text in [
            "(kind='HASH', columns=id, buckets='many')",
            "(kind='HASH', columns=id, buckets=0)",
        ] {
            assert!(matches!(
                Distribution::unify(&tuple(text), None),
                Err(DistributionError::InvalidBuckets { .. })
            ));
        }
    }
}
