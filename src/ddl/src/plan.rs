// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The clauses of a StarRocks `CREATE TABLE` statement.

use std::fmt;

use sr_fragment::ast::display::{self, AstDisplay, AstFormatter, FormatMode};
use sr_fragment::{impl_display, Fragment, Ident};
use sr_props::spec::KeyType;
use sr_props::Distribution;
use sr_props::DistributionKind;

/// How a table is partitioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionSpec {
    /// Expression partitioning, e.g. `PARTITION BY date_trunc('day', dt)`.
    Expressions(Vec<Fragment>),
    /// `PARTITION BY RANGE (cols) (defs)`.
    Range {
        columns: Vec<Fragment>,
        partitions: Vec<String>,
    },
    /// `PARTITION BY LIST (cols) (defs)`.
    List {
        columns: Vec<Fragment>,
        partitions: Vec<String>,
    },
}

/// One clause following the column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Comment(String),
    Key {
        key: KeyType,
        columns: Vec<Fragment>,
    },
    Partition(PartitionSpec),
    Distribution(Distribution),
    OrderBy(Vec<Fragment>),
    /// Generic `'name'='value'` properties.
    Properties(Vec<(String, String)>),
}

impl Clause {
    /// The position of the clause in StarRocks' `CREATE TABLE` grammar.
    fn grammar_position(&self) -> usize {
        match self {
            Clause::Key { .. } => 0,
            Clause::Comment(_) => 1,
            Clause::Partition(_) => 2,
            Clause::Distribution(_) => 3,
            Clause::OrderBy(_) => 4,
            Clause::Properties(_) => 5,
        }
    }
}

fn write_columns<W: fmt::Write>(f: &mut AstFormatter<W>, columns: &[Fragment]) {
    f.write_str("(");
    f.write_node(&display::comma_separated(columns));
    f.write_str(")");
}

fn write_string<W: fmt::Write>(f: &mut AstFormatter<W>, s: &str) {
    f.write_str("'");
    f.write_str(display::escape_single_quote_string(s));
    f.write_str("'");
}

fn write_partitions<W: fmt::Write>(f: &mut AstFormatter<W>, partitions: &[String]) {
    f.write_str(" (");
    let mut delim = "";
    for partition in partitions {
        f.write_str(delim);
        delim = ", ";
        f.write_str(partition);
    }
    f.write_str(")");
}

impl AstDisplay for Clause {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match self {
            Clause::Comment(comment) => {
                f.write_str("COMMENT ");
                write_string(f, comment);
            }
            Clause::Key { key, columns } => {
                f.write_str(key.keyword());
                f.write_str(" ");
                write_columns(f, columns);
            }
            Clause::Partition(PartitionSpec::Expressions(exprs)) => {
                f.write_str("PARTITION BY ");
                f.write_node(&display::comma_separated(exprs));
            }
            Clause::Partition(PartitionSpec::Range {
                columns,
                partitions,
            }) => {
                f.write_str("PARTITION BY RANGE ");
                write_columns(f, columns);
                write_partitions(f, partitions);
            }
            Clause::Partition(PartitionSpec::List {
                columns,
                partitions,
            }) => {
                f.write_str("PARTITION BY LIST ");
                write_columns(f, columns);
                write_partitions(f, partitions);
            }
            Clause::Distribution(distribution) => {
                f.write_str("DISTRIBUTED BY ");
                f.write_str(distribution.kind);
                if distribution.kind == DistributionKind::Hash {
                    f.write_str(" ");
                    write_columns(f, &distribution.columns);
                }
                if let Some(buckets) = distribution.buckets {
                    f.write_str(" BUCKETS ");
                    f.write_str(buckets);
                }
            }
            Clause::OrderBy(columns) => {
                f.write_str("ORDER BY ");
                write_columns(f, columns);
            }
            Clause::Properties(properties) => {
                f.write_str("PROPERTIES (");
                let mut delim = "";
                for (name, value) in properties {
                    f.write_str(delim);
                    delim = ", ";
                    write_string(f, name);
                    f.write_str("=");
                    write_string(f, value);
                }
                f.write_str(")");
            }
        }
    }
}
impl_display!(Clause);

/// A column of the table being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// The column type, as StarRocks SQL.
    pub data_type: String,
    pub comment: Option<String>,
}

impl AstDisplay for ColumnDef {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        f.write_node(&Ident::new(self.name.as_str()));
        f.write_str(" ");
        f.write_str(&self.data_type);
        if let Some(comment) = &self.comment {
            f.write_str(" COMMENT ");
            write_string(f, comment);
        }
    }
}
impl_display!(ColumnDef);

/// The output of the DDL builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    /// Columns, with key columns moved to the front.
    pub columns: Vec<ColumnDef>,
    /// Clauses, in the order they were built.
    pub clauses: Vec<Clause>,
    pub(crate) quote_identifiers: bool,
}

impl TablePlan {
    pub fn clause<F>(&self, pred: F) -> Option<&Clause>
    where
        F: Fn(&Clause) -> bool,
    {
        self.clauses.iter().find(|clause| pred(clause))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Renders the complete `CREATE TABLE` statement for the table `name`,
    /// which may be qualified by a database name.
    pub fn create_table_statement(&self, name: &str, if_not_exists: bool) -> String {
        let mode = if self.quote_identifiers {
            FormatMode::Stable
        } else {
            FormatMode::Simple
        };
        let mut buf = String::new();
        let mut f = AstFormatter::new(&mut buf, mode);
        f.write_str("CREATE TABLE ");
        if if_not_exists {
            f.write_str("IF NOT EXISTS ");
        }
        let name: Vec<Ident> = name.split('.').map(Ident::new).collect();
        f.write_node(&display::separated(&name, "."));
        f.write_str(" (");
        f.write_node(&display::comma_separated(&self.columns));
        f.write_str(")");

        let mut clauses: Vec<&Clause> = self.clauses.iter().collect();
        clauses.sort_by_key(|clause| clause.grammar_position());
        for clause in clauses {
            f.write_str("\n");
            f.write_node(clause);
        }
        buf
    }
}
