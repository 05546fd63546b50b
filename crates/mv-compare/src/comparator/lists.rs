//! List comparison
//!
//! Ordered lists are compared element by element. Unordered lists are
//! reconciled by a greedy best-match assignment over a score matrix holding
//! one full comparison per (actual, expected) pair, which costs O(n * m)
//! element comparisons and keeps all n * m candidate trees alive until the
//! assignment is done. Very large repeating groups should be compared in
//! order.

use mv_core::{FieldStructure, Value};
use tracing::trace;

use super::{Comparator, Slot};
use crate::aggregate::StatusCounts;
use crate::error::ResultResult;
use crate::result::{ComparisonResult, NodeId, ResultNode};

/// Weight of one PASSED node in a candidate score
const PASSED_WEIGHT: u64 = 1_000_000;

/// One scored (actual, expected) pair
struct Candidate {
    score: u64,
    result: ComparisonResult,
}

/// How an element ends up in the result
#[derive(Debug, Clone, Copy)]
enum Pairing {
    Matched { actual: usize, expected: usize },
    ActualOnly(usize),
    ExpectedOnly(usize),
}

impl Comparator<'_> {
    pub(super) fn compare_lists(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: &[Value],
        expected: &[Value],
        slot: Slot<'_>,
        structure: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        let complex = match structure {
            Some(declared) => declared.is_complex(),
            None => actual.iter().chain(expected).any(Value::is_composite),
        };
        let ordered = if complex {
            self.settings.check_groups_order()
        } else {
            self.settings.check_simple_collections_order()
        };
        let element = structure.map(FieldStructure::element);

        trace!(
            field = slot.name(),
            complex,
            ordered,
            actual = actual.len(),
            expected = expected.len(),
            "Comparing lists"
        );

        if ordered {
            self.compare_ordered(result, id, actual, expected, slot, element.as_ref())
        } else {
            self.compare_unordered(result, id, actual, expected, slot, element.as_ref())
        }
    }

    fn compare_ordered(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: &[Value],
        expected: &[Value],
        slot: Slot<'_>,
        element: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        for index in 0..actual.len().max(expected.len()) {
            let child = result.add_child(id, ResultNode::new(index.to_string()))?;
            self.compare_values(
                result,
                child,
                actual.get(index),
                expected.get(index),
                element_slot(slot, index),
                element,
            )?;
        }
        Ok(())
    }

    fn compare_unordered(
        &mut self,
        result: &mut ComparisonResult,
        id: NodeId,
        actual: &[Value],
        expected: &[Value],
        slot: Slot<'_>,
        element: Option<&FieldStructure>,
    ) -> ResultResult<()> {
        let mut matrix = Vec::with_capacity(actual.len());
        for a in actual {
            let mut row = Vec::with_capacity(expected.len());
            for (j, e) in expected.iter().enumerate() {
                row.push(self.score_pair(a, e, element_slot(slot, j), element)?);
            }
            matrix.push(row);
        }

        let pairings = select_pairings(&matrix, actual.len(), expected.len());
        let placed = self.place(pairings, actual.len());

        for (position, pairing) in placed {
            let name = position.to_string();
            match pairing {
                Pairing::Matched {
                    actual: i,
                    expected: j,
                } => {
                    if let Some(candidate) = matrix[i][j].take() {
                        result.graft(id, &name, candidate.result)?;
                    }
                }
                Pairing::ActualOnly(i) => {
                    let child = result.add_child(id, ResultNode::new(name))?;
                    let slot = element_slot(slot, i);
                    self.compare_values(result, child, actual.get(i), None, slot, element)?;
                }
                Pairing::ExpectedOnly(j) => {
                    let child = result.add_child(id, ResultNode::new(name))?;
                    let slot = element_slot(slot, j);
                    self.compare_values(result, child, None, expected.get(j), slot, element)?;
                }
            }
        }
        Ok(())
    }

    /// Compare one candidate pair in a scratch tree
    ///
    /// Returns `None` when the element configuration declares key fields and
    /// they do not match, making the pair ineligible.
    fn score_pair(
        &mut self,
        actual: &Value,
        expected: &Value,
        slot: Slot<'_>,
        element: Option<&FieldStructure>,
    ) -> ResultResult<Option<Candidate>> {
        if let (Value::Composite(a), Value::Composite(e), Ok(config)) =
            (actual, expected, slot.resolve())
        {
            let nested = element.and_then(FieldStructure::message_structure);
            if config.has_key_fields() && !self.keys_match(a, e, &config, nested)? {
                trace!(field = slot.name(), "Key fields differ, skipping candidate");
                return Ok(None);
            }
        }

        let mut scratch = ComparisonResult::new(ResultNode::new(""));
        let root = scratch.root();
        self.compare_values(
            &mut scratch,
            root,
            Some(actual),
            Some(expected),
            slot,
            element,
        )?;

        let counts = StatusCounts::collect(&scratch, root);
        let score = counts.passed as u64 * PASSED_WEIGHT + counts.conditionally_passed as u64;
        Ok(Some(Candidate {
            score,
            result: scratch,
        }))
    }

    /// Result position of every pairing, in insertion order
    fn place(&self, pairings: Vec<Pairing>, rows: usize) -> Vec<(usize, Pairing)> {
        if !self.settings.keep_result_group_order() {
            return pairings.into_iter().enumerate().collect();
        }

        let mut next_extra = rows;
        let mut placed: Vec<_> = pairings
            .into_iter()
            .map(|pairing| match pairing {
                Pairing::Matched { actual, .. } | Pairing::ActualOnly(actual) => (actual, pairing),
                Pairing::ExpectedOnly(_) => {
                    next_extra += 1;
                    (next_extra - 1, pairing)
                }
            })
            .collect();
        placed.sort_by_key(|(position, _)| *position);
        placed
    }
}

fn element_slot(slot: Slot<'_>, index: usize) -> Slot<'_> {
    Slot::Element {
        config: slot.config(),
        name: slot.name(),
        index,
    }
}

/// Greedy best-match assignment
///
/// Each round takes the highest scoring pair among unused rows and columns,
/// scanning row-major so the first maximum wins ties. Leftover elements on
/// either side follow the matches, actual before expected.
fn select_pairings(matrix: &[Vec<Option<Candidate>>], rows: usize, cols: usize) -> Vec<Pairing> {
    let mut used_rows = vec![false; rows];
    let mut used_cols = vec![false; cols];
    let mut pairings = Vec::with_capacity(rows.max(cols));

    loop {
        let mut best: Option<(usize, usize, u64)> = None;
        for (i, row) in matrix.iter().enumerate() {
            if used_rows[i] {
                continue;
            }
            for (j, cell) in row.iter().enumerate() {
                let Some(candidate) = cell else {
                    continue;
                };
                if used_cols[j] {
                    continue;
                }
                if best.map_or(true, |(_, _, score)| candidate.score > score) {
                    best = Some((i, j, candidate.score));
                }
            }
        }

        let Some((i, j, score)) = best else {
            break;
        };
        trace!(actual = i, expected = j, score, "Matched list elements");
        used_rows[i] = true;
        used_cols[j] = true;
        pairings.push(Pairing::Matched {
            actual: i,
            expected: j,
        });
    }

    pairings.extend(
        used_rows
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(i, _)| Pairing::ActualOnly(i)),
    );
    pairings.extend(
        used_cols
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(j, _)| Pairing::ExpectedOnly(j)),
    );
    pairings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(score: u64) -> Option<Candidate> {
        Some(Candidate {
            score,
            result: ComparisonResult::new(ResultNode::new("")),
        })
    }

    fn matched(pairings: &[Pairing]) -> Vec<(usize, usize)> {
        pairings
            .iter()
            .filter_map(|p| match p {
                Pairing::Matched { actual, expected } => Some((*actual, *expected)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_best_pair_is_taken_first() {
        let matrix = vec![
            vec![candidate(1), candidate(5)],
            vec![candidate(7), candidate(2)],
        ];

        let pairings = select_pairings(&matrix, 2, 2);
        assert_eq!(matched(&pairings), vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_ties_go_to_first_in_scan_order() {
        let matrix = vec![
            vec![candidate(3), candidate(3)],
            vec![candidate(3), candidate(3)],
        ];

        let pairings = select_pairings(&matrix, 2, 2);
        assert_eq!(matched(&pairings), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_ineligible_pairs_are_left_over() {
        let matrix = vec![vec![None, candidate(0)], vec![None, None]];

        let pairings = select_pairings(&matrix, 2, 2);
        assert_eq!(matched(&pairings), vec![(0, 1)]);
        assert!(matches!(pairings[1], Pairing::ActualOnly(1)));
        assert!(matches!(pairings[2], Pairing::ExpectedOnly(0)));
    }

    #[test]
    fn test_uneven_sides() {
        let matrix = vec![vec![candidate(2)], vec![candidate(4)], vec![candidate(1)]];

        let pairings = select_pairings(&matrix, 3, 1);
        assert_eq!(matched(&pairings), vec![(1, 0)]);
        assert_eq!(pairings.len(), 3);
    }
}
