// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use itertools::Itertools;
use proptest::prelude::*;

use sr_fragment::ast::display::AstDisplay;
use sr_fragment::{parse_fragment, Fragment, FunctionKind, Literal};

/// Renders a fragment as a compact tree, one node kind per constructor.
fn explain(fragment: &Fragment) -> String {
    let list = |items: &[Fragment]| items.iter().map(explain).join(", ");
    match fragment {
        Fragment::Identifier(ident) => format!("identifier({})", ident.as_str()),
        Fragment::Column(column) => match column.name.quote_style() {
            Some(q) => format!("column({} quoted {})", column, q),
            None => format!("column({})", column),
        },
        Fragment::Literal(Literal::String(s)) => format!("string({})", s),
        Fragment::Literal(Literal::Number(n)) => format!("number({})", n),
        Fragment::Literal(Literal::Boolean(b)) => format!("boolean({})", b),
        Fragment::Literal(Literal::Null) => "null".to_string(),
        Fragment::Tuple(items) => format!("tuple({})", list(items)),
        Fragment::Paren(inner) => format!("paren({})", explain(inner)),
        Fragment::Array(items) => format!("array({})", list(items)),
        Fragment::Eq(left, right) => format!("eq({}, {})", explain(left), explain(right)),
        Fragment::Function(func) => {
            let kind = match func.kind {
                FunctionKind::Builtin => "builtin",
                FunctionKind::Anonymous => "anonymous",
            };
            format!("{}:{}({})", kind, func.name, list(&func.args))
        }
        Fragment::Other(sql) => format!("other({})", sql),
    }
}

#[test]
fn datadriven() {
    use datadriven::{walk, TestCase};

    fn parse(tc: &TestCase) -> String {
        let input = tc.input.strip_suffix('\n').unwrap_or(&tc.input);
        match parse_fragment(input) {
            Ok(fragment) => {
                if tc.args.get("stable").is_some() {
                    format!("{}\n", fragment.to_ast_string_stable())
                } else {
                    format!("{}\n", explain(&fragment))
                }
            }
            Err(_) => "error\n".to_string(),
        }
    }

    walk("tests/testdata", |f| {
        f.run(|test_case| -> String {
            match test_case.directive.as_str() {
                "parse" => parse(test_case),
                dir => panic!("unhandled directive {}", dir),
            }
        })
    });
}

proptest! {
    #[test]
    fn column_lists_roundtrip(names in prop::collection::vec("c_[a-z0-9_]{0,8}", 1..6)) {
        let text = names.iter().join(", ");
        let parsed = parse_fragment(&text).unwrap();
        let expected: Vec<_> = names.iter().map(|n| Fragment::column(n.as_str())).collect();
        if names.len() == 1 {
            prop_assert_eq!(&parsed, &expected[0]);
        } else {
            prop_assert_eq!(&parsed, &Fragment::Tuple(expected));
        }
        // Rendering and parsing again yields the same tree.
        let rendered = parsed.to_ast_string_simple();
        let reparsed = parse_fragment(&rendered).unwrap();
        match (&parsed, reparsed) {
            (Fragment::Column(_), reparsed) => prop_assert_eq!(&parsed, &reparsed),
            (Fragment::Tuple(items), Fragment::Tuple(reparsed)) => prop_assert_eq!(items, &reparsed),
            (_, reparsed) => prop_assert!(false, "unexpected reparse {:?}", reparsed),
        }
    }
}
