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

use sr_fragment::Fragment;
use sr_props::spec::{DISTRIBUTED_BY, PRIMARY_KEY};
use sr_props::types::{DeclarativeType, EnumType};
use sr_props::{Distribution, DistributionKind, Normalized, RawValue, STARROCKS_PROPERTIES};

fn column_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("c_[a-z0-9_]{0,8}", 1..5)
}

fn kind_spelling() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["HASH", "hash", "Hash", "RANDOM", "random", "rAnDoM"])
        .prop_map(String::from)
}

fn normalize(name: &str, raw: &RawValue) -> Normalized {
    STARROCKS_PROPERTIES
        .validate_and_normalize(name, raw)
        .unwrap_or_else(|e| panic!("{raw}: {e}"))
}

proptest! {
    #[test]
    fn quote_forms_are_equivalent(names in column_names()) {
        let joined = names.iter().join(", ");
        let expected = Normalized::List(
            names.iter().map(|n| Normalized::Node(Fragment::column(n.as_str()))).collect(),
        );
        let forms = [
            RawValue::from(joined.as_str()),
            RawValue::from(format!("({})", joined)),
            RawValue::parsed(&format!("'{}'", joined)).unwrap(),
            RawValue::parsed(&format!("\"{}\"", joined)).unwrap(),
            RawValue::List(names.iter().map(|n| RawValue::from(n.as_str())).collect()),
        ];
        for raw in &forms {
            prop_assert_eq!(&normalize(PRIMARY_KEY, raw), &expected, "{}", raw);
        }
    }

    #[test]
    fn single_pairs_match_their_multi_field_form(kind in kind_spelling(), buckets in 1u32..512) {
        let single = normalize(DISTRIBUTED_BY, &format!("(kind={})", kind).into());
        let multiple = normalize(
            DISTRIBUTED_BY,
            &format!("(kind='{}', buckets={})", kind, buckets).into(),
        );
        prop_assert_eq!(
            single.as_map().and_then(|m| m.get("kind")),
            multiple.as_map().and_then(|m| m.get("kind"))
        );
    }

    #[test]
    fn enum_normalization_is_idempotent(kind in kind_spelling()) {
        let ty = EnumType::new(["HASH", "RANDOM"]);
        let once = ty.conform(&RawValue::from(kind.as_str())).unwrap().unwrap();
        let twice = ty.conform(&RawValue::from(once.clone())).unwrap().unwrap();
        let upper = kind.to_uppercase();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.as_str(), Some(upper.as_str()));
    }

    #[test]
    fn distribution_forms_unify(names in column_names(), buckets in 1u32..512) {
        let columns = names.iter().join(", ");
        let structured = normalize(
            DISTRIBUTED_BY,
            &format!("(kind='HASH', columns=({}), buckets={})", columns, buckets).into(),
        );
        let call = normalize(DISTRIBUTED_BY, &format!("HASH({})", columns).into());
        let expected = Distribution {
            kind: DistributionKind::Hash,
            columns: names.iter().map(|n| Fragment::column(n.as_str())).collect(),
            buckets: Some(buckets),
        };
        prop_assert_eq!(Distribution::unify(&structured, None), Ok(expected.clone()));
        prop_assert_eq!(Distribution::unify(&call, Some(buckets)), Ok(expected));
    }

    #[test]
    fn random_forms_unify(
        kind in prop::sample::select(vec!["RANDOM", "random", "rAnDoM"]),
        buckets in 1u32..512,
    ) {
        let expected = Distribution {
            kind: DistributionKind::Random,
            columns: vec![],
            buckets: Some(buckets),
        };
        // `RANDOM BUCKETS n` reaches unification as the keyword plus a count.
        let keyword = normalize(DISTRIBUTED_BY, &kind.into());
        prop_assert_eq!(Distribution::unify(&keyword, Some(buckets)), Ok(expected.clone()));
        let call = normalize(DISTRIBUTED_BY, &format!("{}()", kind).into());
        prop_assert_eq!(Distribution::unify(&call, Some(buckets)), Ok(expected.clone()));
        let structured = normalize(
            DISTRIBUTED_BY,
            &format!("(kind={}, buckets={})", kind, buckets).into(),
        );
        prop_assert_eq!(Distribution::unify(&structured, None), Ok(expected.clone()));
        let bare = Distribution { buckets: None, ..expected };
        prop_assert_eq!(Distribution::unify(&keyword, None), Ok(bare));
    }

    #[test]
    fn normalized_values_conform(names in column_names()) {
        let columns = names.iter().join(", ");
        for (name, text) in [
            (PRIMARY_KEY, columns.clone()),
            (DISTRIBUTED_BY, format!("(kind='HASH', columns=({}))", columns)),
            (DISTRIBUTED_BY, format!("HASH({})", columns)),
        ] {
            let normalized = normalize(name, &text.as_str().into());
            prop_assert_eq!(STARROCKS_PROPERTIES.check_output(name, &normalized), Ok(()));
        }
    }
}

/// Each distribution spelling is accepted by exactly one of the alternatives
/// of `distributed_by`, so their order does not change the result.
#[test]
fn distribution_alternatives_do_not_overlap() {
    let alternatives = STARROCKS_PROPERTIES
        .input_type(DISTRIBUTED_BY)
        .alternatives()
        .expect("distributed_by is a union");
    assert_eq!(alternatives.len(), 3);
    for text in [
        "(kind='HASH', columns=(id, dt), buckets=10)",
        "(kind=RANDOM)",
        "kind='RANDOM'",
        "RANDOM",
        "'random'",
        "HASH(id)",
        "RANDOM()",
        "hash(id, dt)",
    ] {
        let raw = RawValue::from(text);
        let matches = alternatives
            .iter()
            .filter(|ty| ty.validate(&raw).unwrap().is_match())
            .count();
        assert_eq!(matches, 1, "{text}");
    }
}
