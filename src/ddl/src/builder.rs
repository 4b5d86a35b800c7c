// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Turns a table definition into a [`TablePlan`].
//!
//! Each clause is built by its own step. A step reads the properties it is
//! responsible for and reports them as claimed; whatever no step claims ends
//! up in the generic `PROPERTIES` clause. The caller's property mapping is
//! only ever read.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use sr_fragment::ast::display::AstDisplay;
use sr_fragment::Fragment;
use sr_props::distribution::parse_buckets;
use sr_props::spec::{
    KeyType, PropertySpecs, BUCKETS, DISTRIBUTED_BY, ORDER_BY, PARTITIONED_BY, PARTITIONS,
};
use sr_props::{
    Distribution, DistributionError, DistributionKind, Normalized, RawValue, STARROCKS_PROPERTIES,
};
use tracing::{debug, info, warn};

use crate::config::{truncate, DdlConfig};
use crate::error::DdlError;
use crate::plan::{Clause, ColumnDef, PartitionSpec, TablePlan};

/// Splits `HASH(id) BUCKETS 10` into the distribution and its bucket count.
static BUCKETS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?P<spec>.*\S)\s+BUCKETS\s+(?P<buckets>\d+)\s*$")
        .expect("valid regex")
});

/// Everything the model loader knows about a table to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDefinition {
    /// Column names and types, in the order the model produces them.
    pub columns: Vec<(String, String)>,
    /// Physical properties, keyed by property name.
    pub properties: BTreeMap<String, RawValue>,
    /// Partition expressions given outside of the properties.
    pub partitioned_by: Option<Vec<Fragment>>,
    /// Clustering expressions given outside of the properties.
    pub clustered_by: Option<Vec<Fragment>>,
    /// Primary key columns given outside of the properties.
    pub primary_key: Option<Vec<String>>,
    pub description: Option<String>,
    pub column_descriptions: BTreeMap<String, String>,
}

/// The key clause chosen for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyDef {
    key: KeyType,
    columns: Vec<Fragment>,
}

impl KeyDef {
    fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(Fragment::name)
            .map(String::from)
            .collect()
    }
}

/// The result of one build step.
struct Step<T> {
    output: T,
    claimed: BTreeSet<String>,
}

impl<T> Step<T> {
    fn new(output: T) -> Self {
        Step {
            output,
            claimed: BTreeSet::new(),
        }
    }

    fn claim(mut self, name: &str) -> Self {
        self.claimed.insert(name.to_string());
        self
    }
}

/// Builds [`TablePlan`]s for StarRocks.
#[derive(Debug, Clone)]
pub struct DdlBuilder<'a> {
    config: DdlConfig,
    specs: &'a PropertySpecs,
}

impl Default for DdlBuilder<'static> {
    fn default() -> Self {
        DdlBuilder::new(DdlConfig::default())
    }
}

impl DdlBuilder<'static> {
    pub fn new(config: DdlConfig) -> Self {
        DdlBuilder::with_specs(config, &STARROCKS_PROPERTIES)
    }
}

impl<'a> DdlBuilder<'a> {
    pub fn with_specs(config: DdlConfig, specs: &'a PropertySpecs) -> Self {
        DdlBuilder { config, specs }
    }

    pub fn config(&self) -> &DdlConfig {
        &self.config
    }

    /// Builds the clauses of `def` and orders its columns for the key.
    pub fn build(&self, def: &TableDefinition) -> Result<TablePlan, DdlError> {
        let props = canonical_properties(&def.properties)?;

        let key = self.key(def, &props)?;
        let partition = self.partition(def, &props)?;
        let distribution = self.distribution(&props)?;
        let order = self.order(def, &props)?;

        let claims = [
            &key.claimed,
            &partition.claimed,
            &distribution.claimed,
            &order.claimed,
        ];
        debug_assert!(
            claims
                .iter()
                .tuple_combinations()
                .all(|(a, b)| a.is_disjoint(b)),
            "properties claimed twice: {:?}",
            claims
        );
        let claimed: BTreeSet<&str> = claims
            .iter()
            .flat_map(|c| c.iter())
            .map(String::as_str)
            .collect();
        debug!(claimed = ?claimed, "claimed properties");
        let properties = self.properties(&props, &claimed)?;

        let columns = match &key.output {
            Some(key) => reorder_columns(&def.columns, key.key, &key.column_names())?,
            None => def.columns.clone(),
        };
        let columns = columns
            .into_iter()
            .map(|(name, data_type)| {
                let comment = def
                    .column_descriptions
                    .get(&name)
                    .map(|c| truncate(c, self.config.max_column_comment_length).to_string());
                ColumnDef {
                    name,
                    data_type,
                    comment,
                }
            })
            .collect();

        let mut clauses = vec![];
        if let Some(description) = def.description.as_deref().filter(|d| !d.is_empty()) {
            let comment = truncate(description, self.config.max_table_comment_length);
            clauses.push(Clause::Comment(comment.to_string()));
        }
        if let Some(KeyDef { key, columns }) = key.output {
            clauses.push(Clause::Key { key, columns });
        }
        clauses.extend(partition.output.map(Clause::Partition));
        clauses.extend(distribution.output.map(Clause::Distribution));
        clauses.extend(order.output.map(Clause::OrderBy));
        if !properties.is_empty() {
            clauses.push(Clause::Properties(properties));
        }

        Ok(TablePlan {
            columns,
            clauses,
            quote_identifiers: self.config.quote_identifiers,
        })
    }

    fn normalize(&self, name: &str, raw: &RawValue) -> Result<Normalized, DdlError> {
        let normalized = self.specs.validate_and_normalize(name, raw)?;
        if self.config.verify_normalized_output {
            self.specs.check_output(name, &normalized)?;
        }
        Ok(normalized)
    }

    fn key(
        &self,
        def: &TableDefinition,
        props: &BTreeMap<String, &RawValue>,
    ) -> Result<Step<Option<KeyDef>>, DdlError> {
        let present: Vec<KeyType> = KeyType::ALL
            .into_iter()
            .filter(|key| props.contains_key(key.property_name()))
            .collect();
        if present.len() > 1 {
            return Err(DdlError::ConflictingKeyTypes {
                properties: present
                    .iter()
                    .map(|key| key.property_name().to_string())
                    .collect(),
            });
        }

        let key = match (def.primary_key.as_deref(), present.first()) {
            (Some(columns), found) if !columns.is_empty() => {
                if let Some(found) = found {
                    warn!(
                        property = found.property_name(),
                        primary_key = ?columns,
                        "primary key parameter overrides key property"
                    );
                }
                Some(KeyDef {
                    key: KeyType::Primary,
                    columns: columns.iter().map(|c| Fragment::column(c.as_str())).collect(),
                })
            }
            (_, Some(&key)) => {
                let name = key.property_name();
                let columns = fragments(&self.normalize(name, props[name])?);
                if let Some(bad) = columns.iter().find(|c| !matches!(c, Fragment::Column(_))) {
                    return Err(DdlError::InvalidKeyColumn {
                        key,
                        value: bad.to_ast_string_simple(),
                    });
                }
                info!(property = name, columns = %columns.iter().join(", "), "extracted key columns");
                Some(KeyDef { key, columns })
            }
            _ => None,
        };
        Ok(present
            .iter()
            .fold(Step::new(key), |step, key| step.claim(key.property_name())))
    }

    fn partition(
        &self,
        def: &TableDefinition,
        props: &BTreeMap<String, &RawValue>,
    ) -> Result<Step<Option<PartitionSpec>>, DdlError> {
        let mut step = Step::new(None);
        let exprs = match (def.partitioned_by.as_deref(), props.get(PARTITIONED_BY)) {
            (Some(exprs), found) if !exprs.is_empty() => {
                if found.is_some() {
                    warn!("partitioned_by parameter overrides partitioned_by property");
                    step = step.claim(PARTITIONED_BY);
                }
                exprs.to_vec()
            }
            (_, Some(raw)) => {
                step = step.claim(PARTITIONED_BY);
                fragments(&self.normalize(PARTITIONED_BY, raw)?)
            }
            _ => vec![],
        };
        let partitions = match props.get(PARTITIONS) {
            Some(raw) => {
                step = step.claim(PARTITIONS);
                let partitions = self.normalize(PARTITIONS, raw)?;
                let partitions = match partitions.as_items() {
                    Some(items) => items.iter().map(Normalized::to_text).collect(),
                    None => vec![partitions.to_text()],
                };
                Some(partitions)
            }
            None => None,
        };

        let is_range_or_list =
            |expr: &Fragment| matches!(expr, Fragment::Function(f) if f.is_named("RANGE") || f.is_named("LIST"));
        let spec = match exprs.as_slice() {
            [] if partitions.is_some() => return Err(DdlError::PartitionsRequireRangeOrList),
            [] => None,
            [Fragment::Function(func)] if func.is_named("RANGE") => Some(PartitionSpec::Range {
                columns: func.args.clone(),
                partitions: partitions.unwrap_or_default(),
            }),
            [Fragment::Function(func)] if func.is_named("LIST") => Some(PartitionSpec::List {
                columns: func.args.clone(),
                partitions: partitions.unwrap_or_default(),
            }),
            exprs if exprs.iter().any(is_range_or_list) => {
                return Err(DdlError::InvalidPartitionSpec {
                    spec: exprs.iter().map(|e| e.to_ast_string_simple()).join(", "),
                })
            }
            _ if partitions.is_some() => return Err(DdlError::PartitionsRequireRangeOrList),
            exprs => Some(PartitionSpec::Expressions(exprs.to_vec())),
        };
        step.output = spec;
        Ok(step)
    }

    fn distribution(
        &self,
        props: &BTreeMap<String, &RawValue>,
    ) -> Result<Step<Option<Distribution>>, DdlError> {
        let distribution_error = |property: &str| {
            let property = property.to_string();
            move |source| DdlError::Distribution { property, source }
        };

        let mut step = Step::new(None);
        let separate = match props.get(BUCKETS) {
            Some(raw) => {
                step = step.claim(BUCKETS);
                let buckets = self.normalize(BUCKETS, raw)?;
                Some(parse_buckets(&buckets).map_err(distribution_error(BUCKETS))?)
            }
            None => None,
        };
        let Some(raw) = props.get(DISTRIBUTED_BY) else {
            if separate.is_some() {
                return Err(DdlError::BucketsWithoutDistribution);
            }
            return Ok(step);
        };
        step = step.claim(DISTRIBUTED_BY);

        let (raw, suffix) = split_buckets(raw).map_err(distribution_error(DISTRIBUTED_BY))?;
        let buckets = match (suffix, separate) {
            (Some(suffix), Some(property)) => {
                return Err(DdlError::ConflictingBuckets { suffix, property })
            }
            (suffix, separate) => suffix.or(separate),
        };
        let normalized = self.normalize(DISTRIBUTED_BY, &raw)?;
        let distribution = Distribution::unify(&normalized, buckets)
            .map_err(distribution_error(DISTRIBUTED_BY))?;
        if distribution.kind == DistributionKind::Hash && distribution.columns.is_empty() {
            return Err(DdlError::HashWithoutColumns);
        }
        step.output = Some(distribution);
        Ok(step)
    }

    fn order(
        &self,
        def: &TableDefinition,
        props: &BTreeMap<String, &RawValue>,
    ) -> Result<Step<Option<Vec<Fragment>>>, DdlError> {
        let mut step = Step::new(None);
        step.output = match (def.clustered_by.as_deref(), props.get(ORDER_BY)) {
            (Some(exprs), found) if !exprs.is_empty() => {
                if found.is_some() {
                    warn!("clustered_by parameter overrides order_by property");
                    step = step.claim(ORDER_BY);
                }
                Some(exprs.to_vec())
            }
            (_, Some(raw)) => {
                step = step.claim(ORDER_BY);
                Some(fragments(&self.normalize(ORDER_BY, raw)?)).filter(|c| !c.is_empty())
            }
            _ => None,
        };
        Ok(step)
    }

    /// Renders every unclaimed property as a string.
    fn properties(
        &self,
        props: &BTreeMap<String, &RawValue>,
        claimed: &BTreeSet<&str>,
    ) -> Result<Vec<(String, String)>, DdlError> {
        props
            .iter()
            .filter(|(name, _)| !claimed.contains(name.as_str()))
            .map(|(name, raw)| -> Result<(String, String), DdlError> {
                Ok((name.clone(), self.normalize(name, raw)?.to_text()))
            })
            .collect()
    }
}

/// Resolves property names to their canonical spelling.
fn canonical_properties(
    properties: &BTreeMap<String, RawValue>,
) -> Result<BTreeMap<String, &RawValue>, DdlError> {
    let mut spellings: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for name in properties.keys() {
        spellings
            .entry(PropertySpecs::canonical_name(name))
            .or_default()
            .push(name);
    }
    if let Some((name, spellings)) = spellings.iter().find(|(_, s)| s.len() > 1) {
        return Err(DdlError::DuplicateProperty {
            name: name.clone(),
            spellings: spellings.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(properties
        .iter()
        .map(|(name, raw)| (PropertySpecs::canonical_name(name), raw))
        .collect())
}

/// The items of a normalized list, or the value itself.
fn fragments(normalized: &Normalized) -> Vec<Fragment> {
    match normalized.as_items() {
        Some(items) => items.iter().map(Normalized::to_fragment).collect(),
        None => vec![normalized.to_fragment()],
    }
}

/// Reads quoted distributions as text and splits off a `BUCKETS n` suffix.
fn split_buckets(raw: &RawValue) -> Result<(Cow<'_, RawValue>, Option<u32>), DistributionError> {
    let text = match raw {
        RawValue::Text(text) => text.as_str(),
        RawValue::Node(node) => match node.quoted_text() {
            Some(text) => text,
            None => return Ok((Cow::Borrowed(raw), None)),
        },
        RawValue::List(_) => return Ok((Cow::Borrowed(raw), None)),
    };
    match BUCKETS_SUFFIX.captures(text) {
        Some(captures) => {
            let buckets = parse_buckets(&Normalized::Str(captures["buckets"].to_string()))?;
            Ok((Cow::Owned(RawValue::from(&captures["spec"])), Some(buckets)))
        }
        None => Ok((Cow::Owned(RawValue::from(text)), None)),
    }
}

/// Moves the key columns to the front of `columns`, in key order. The other
/// columns keep their relative order.
pub fn reorder_columns<T: Clone>(
    columns: &[(String, T)],
    key: KeyType,
    key_columns: &[String],
) -> Result<Vec<(String, T)>, DdlError> {
    let missing: Vec<String> = key_columns
        .iter()
        .filter(|k| !columns.iter().any(|(name, _)| name == *k))
        .unique()
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(DdlError::MissingKeyColumns {
            key,
            missing,
            available: columns.iter().map(|(name, _)| name.clone()).collect(),
        });
    }

    let mut reordered = Vec::with_capacity(columns.len());
    for key_column in key_columns.iter().unique() {
        if let Some(column) = columns.iter().find(|(name, _)| name == key_column) {
            reordered.push(column.clone());
        }
    }
    reordered.extend(
        columns
            .iter()
            .filter(|(name, _)| !key_columns.contains(name))
            .cloned(),
    );
    info!(
        key = %key,
        original = %columns.iter().map(|(name, _)| name).join(", "),
        reordered = %reordered.iter().map(|(name, _)| name).join(", "),
        "reordered columns for key"
    );
    Ok(reordered)
}
