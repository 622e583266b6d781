//! Property tests for the set diff and decoder determinism.

use std::collections::BTreeSet;

use portal::core::decoder::Decoder;
use portal::core::payloads;
use portal::core::reconcile::reconcile;
use proptest::prelude::*;
use serde_json::{Value, json};

fn id_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("p[0-9]{1,2}", 0..12)
}

proptest! {
    #[test]
    fn added_and_removed_are_disjoint(original in id_set(), current in id_set()) {
        let diff = reconcile(&original, &current);
        prop_assert!(diff.added.is_disjoint(&diff.removed));
    }

    #[test]
    fn applying_the_diff_yields_current(original in id_set(), current in id_set()) {
        let diff = reconcile(&original, &current);
        prop_assert_eq!(diff.apply_to(&original), current);
    }

    #[test]
    fn identical_sets_have_empty_diff(set in id_set()) {
        let diff = reconcile(&set, &set);
        prop_assert!(diff.is_empty());
        prop_assert!(diff.added.is_empty() && diff.removed.is_empty());
    }

    #[test]
    fn diff_only_names_members_of_either_side(original in id_set(), current in id_set()) {
        let diff = reconcile(&original, &current);
        prop_assert!(diff.added.iter().all(|id| current.contains(id) && !original.contains(id)));
        prop_assert!(diff.removed.iter().all(|id| original.contains(id) && !current.contains(id)));
    }
}

fn course_payload() -> impl Strategy<Value = Value> {
    (
        "[a-z0-9]{1,8}",
        "[A-Za-z ]{1,16}",
        1u32..=28,
        1u32..=12,
        2000i32..2030,
        1u32..=28,
        1u32..=12,
    )
        .prop_map(|(id, name, sd, sm, year, ed, em)| {
            json!({
                "id": id,
                "subject": { "subjectName": name },
                "startDate": format!("{sd}/{sm}/{year}"),
                "endDate": format!("{ed}/{em}/{year}"),
            })
        })
}

fn decode_twice<A: PartialEq + std::fmt::Debug + 'static>(
    decoder: &Decoder<A>,
    payload: &Value,
) -> Result<(), TestCaseError> {
    let first = decoder.decode(payload);
    let second = decoder.decode(payload);
    prop_assert_eq!(first, second);
    Ok(())
}

proptest! {
    #[test]
    fn course_decoding_is_deterministic(payload in course_payload()) {
        let decoder = payloads::course();
        prop_assert!(decoder.decode(&payload).is_ok());
        decode_twice(&decoder, &payload)?;
    }

    #[test]
    fn dropping_a_required_field_always_fails(
        payload in course_payload(),
        key in prop::sample::select(vec!["id", "subject", "startDate", "endDate"]),
    ) {
        let mut payload = payload;
        if let Some(object) = payload.as_object_mut() {
            object.remove(key);
        }
        let err = payloads::course().decode(&payload).expect_err("missing field");
        let path = err.path.to_string();
        prop_assert!(path.starts_with(key), "path {} does not name {}", path, key);
    }
}
