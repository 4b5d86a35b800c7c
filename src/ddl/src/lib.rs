// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! StarRocks `CREATE TABLE` construction.
//!
//! The builder consumes a [`TableDefinition`], normalizes its physical
//! properties with [`sr_props`], and produces a [`TablePlan`]: the key,
//! partition, distribution, ordering and generic property clauses, plus the
//! table's columns with the key columns moved to the front as StarRocks
//! requires.

mod builder;

pub mod config;
pub mod error;
pub mod plan;

pub use builder::{reorder_columns, DdlBuilder, TableDefinition};
pub use config::DdlConfig;
pub use error::DdlError;
pub use plan::{Clause, ColumnDef, PartitionSpec, TablePlan};
