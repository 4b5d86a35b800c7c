// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use datadriven::{walk, TestCase};
use sr_props::{RawValue, STARROCKS_PROPERTIES};

/// Runs `normalize prop=<name>` test cases.
///
/// The input is passed as text unless the `parsed` argument is given, in
/// which case it is parsed first, the way the model loader does for values
/// written as SQL.
fn normalize(tc: &TestCase) -> String {
    let input = tc.input.strip_suffix('\n').unwrap_or(&tc.input);
    let Some(prop) = tc.args.get("prop").and_then(|values| values.first()) else {
        panic!("normalize requires a prop argument");
    };
    let raw = if tc.args.get("parsed").is_some() {
        match RawValue::parsed(input) {
            Ok(raw) => raw,
            Err(e) => return format!("unparsable: {}\n", e),
        }
    } else {
        RawValue::from(input)
    };
    match STARROCKS_PROPERTIES.validate_and_normalize(prop, &raw) {
        Ok(normalized) => {
            if let Err(e) = STARROCKS_PROPERTIES.check_output(prop, &normalized) {
                return format!("nonconforming output: {}\n", e);
            }
            format!("{}\n", normalized)
        }
        Err(e) => match e.detail() {
            Some(detail) => format!("error: {}\ndetail: {}\n", e, detail),
            None => format!("error: {}\n", e),
        },
    }
}

#[test]
fn datadriven() {
    walk("tests/testdata", |f| {
        f.run(|test_case| -> String {
            match test_case.directive.as_str() {
                "normalize" => normalize(test_case),
                dir => panic!("unhandled directive {}", dir),
            }
        })
    });
}
