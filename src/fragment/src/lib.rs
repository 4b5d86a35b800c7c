// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Expression fragments that appear in StarRocks physical properties.
//!
//! Property values such as `(id, dt)`, `HASH(id)` or
//! `(kind='HASH', buckets=10)` are parsed with a generic SQL expression parser
//! and lowered into the small, closed [`Fragment`](ast::Fragment) tree defined
//! here. Everything downstream pattern matches on that tree and never sees the
//! parser's own AST.

pub mod ast;
pub mod parser;

pub use ast::{ColumnRef, Fragment, Function, FunctionKind, Ident, Literal};
pub use parser::{parse_fragment, UnparsableFragment};
