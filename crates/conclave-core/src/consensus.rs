use std::collections::BTreeMap;

use conclave_types::{ConclaveError, Label, PeerId, Result};

/// Reduce a round's responses to the majority label.
///
/// Absent responses are discarded before counting. When several labels tie
/// for the highest count, the lowest label in lexicographic byte order wins,
/// so the result never depends on map iteration order.
pub fn resolve(responses: &BTreeMap<PeerId, Option<Label>>) -> Result<Label> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in responses.values().flatten() {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }

    // Ascending label order: keeping the first strictly-greater count makes
    // the lowest label win ties.
    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        let better = match best {
            Some((_, best_count)) => count > best_count,
            None => true,
        };
        if better {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| label.to_string())
        .ok_or(ConclaveError::NoValidResponses)
}

/// Ledger verdicts for a finished round: +1 for each responder matching the
/// majority, -1 for each responder that differed. Absent peers get no entry.
pub fn agreement_deltas(
    responses: &BTreeMap<PeerId, Option<Label>>,
    majority: &str,
) -> BTreeMap<PeerId, i64> {
    responses
        .iter()
        .filter_map(|(id, resp)| {
            resp.as_ref()
                .map(|label| (id.clone(), if label == majority { 1 } else { -1 }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn responses(entries: &[(&str, Option<&str>)]) -> BTreeMap<PeerId, Option<Label>> {
        entries
            .iter()
            .map(|(id, resp)| (id.to_string(), resp.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_unique_majority() {
        let responses = responses(&[("p1", Some("4")), ("p2", Some("4")), ("p3", Some("9"))]);
        assert_eq!(resolve(&responses).unwrap(), "4");
    }

    #[test]
    fn test_absent_responses_are_discarded() {
        let responses = responses(&[("p1", Some("9")), ("p2", None), ("p3", None)]);
        assert_eq!(resolve(&responses).unwrap(), "9");
    }

    #[test]
    fn test_all_absent_is_an_error() {
        let responses = responses(&[("p1", None), ("p2", None)]);
        assert!(matches!(
            resolve(&responses),
            Err(ConclaveError::NoValidResponses)
        ));
    }

    #[test]
    fn test_empty_round_is_an_error() {
        let responses = BTreeMap::new();
        assert!(matches!(
            resolve(&responses),
            Err(ConclaveError::NoValidResponses)
        ));
    }

    #[test]
    fn test_tie_breaks_to_lowest_label() {
        let responses = responses(&[
            ("p1", Some("9")),
            ("p2", Some("4")),
            ("p3", Some("9")),
            ("p4", Some("4")),
        ]);
        assert_eq!(resolve(&responses).unwrap(), "4");
    }

    #[test]
    fn test_tie_break_is_byte_order() {
        let responses = responses(&[("p1", Some("cat")), ("p2", Some("car"))]);
        assert_eq!(resolve(&responses).unwrap(), "car");
    }

    #[test]
    fn test_deltas_for_mixed_round() {
        let responses = responses(&[("p1", Some("4")), ("p2", Some("9")), ("p3", None)]);
        let deltas = agreement_deltas(&responses, "4");
        assert_eq!(deltas.get("p1"), Some(&1));
        assert_eq!(deltas.get("p2"), Some(&-1));
        assert_eq!(deltas.get("p3"), None);
        assert_eq!(deltas.len(), 2);
    }

    proptest! {
        /// The resolved label always carries a maximal count among the
        /// non-absent responses, and among maximal labels it is the lowest.
        #[test]
        fn prop_resolve_matches_brute_force(labels in proptest::collection::vec(0u8..5, 1..20)) {
            let responses: BTreeMap<PeerId, Option<Label>> = labels
                .iter()
                .enumerate()
                .map(|(i, l)| (format!("p{i:02}"), Some(l.to_string())))
                .collect();

            let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
            for l in &labels {
                *counts.entry(l.to_string()).or_insert(0) += 1;
            }
            let max = counts.values().copied().max().unwrap();
            let expected = counts
                .iter()
                .filter(|(_, n)| **n == max)
                .map(|(l, _)| l.clone())
                .min()
                .unwrap();

            prop_assert_eq!(resolve(&responses).unwrap(), expected);
        }

        /// Verdicts cover exactly the non-absent peers and are always +1/-1.
        #[test]
        fn prop_deltas_cover_responders(
            entries in proptest::collection::btree_map(
                "p[0-9]{2}",
                proptest::option::of(0u8..5),
                1..20,
            )
        ) {
            let responses: BTreeMap<PeerId, Option<Label>> = entries
                .iter()
                .map(|(id, l)| (id.clone(), l.map(|v| v.to_string())))
                .collect();

            if let Ok(majority) = resolve(&responses) {
                let deltas = agreement_deltas(&responses, &majority);
                for (id, resp) in &responses {
                    match resp {
                        Some(label) if label == &majority => {
                            prop_assert_eq!(deltas.get(id), Some(&1))
                        }
                        Some(_) => prop_assert_eq!(deltas.get(id), Some(&-1)),
                        None => prop_assert_eq!(deltas.get(id), None),
                    }
                }
                prop_assert_eq!(
                    deltas.len(),
                    responses.values().filter(|r| r.is_some()).count()
                );
            }
        }
    }
}
