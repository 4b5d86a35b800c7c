// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// Knobs for building StarRocks DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DdlConfig {
    /// Table comments longer than this many characters are truncated.
    pub max_table_comment_length: usize,
    /// Column comments longer than this many characters are truncated.
    pub max_column_comment_length: usize,
    /// Whether to backtick quote every identifier in rendered statements.
    pub quote_identifiers: bool,
    /// Whether to check every normalized property against its output type.
    pub verify_normalized_output: bool,
}

impl Default for DdlConfig {
    fn default() -> Self {
        DdlConfig {
            max_table_comment_length: 2048,
            max_column_comment_length: 255,
            quote_identifiers: true,
            verify_normalized_output: false,
        }
    }
}

/// Truncates `s` to at most `max` characters.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
