//! Network suppression.
//!
//! After cloning, Opt-aiNet thins the candidate pool so that only the best
//! member of every neighbourhood survives. Two candidates are neighbours
//! when their mismatch distance is strictly below the threshold.

use crate::solution::{compare_costs, Gene, Solution};
use std::cmp::Ordering;

/// Number of loci at which `a` and `b` differ, as a distance.
///
/// Real-valued genes are compared exactly, so any numeric difference
/// counts as a full mismatch.
pub fn mismatch_distance<G: Gene>(a: &Solution<G>, b: &Solution<G>) -> f64 {
    a.mismatch_count(b) as f64
}

/// Keeps every candidate that is the best of its own neighbourhood.
///
/// A candidate survives iff no neighbour has a strictly lower cost and no
/// neighbour earlier in `candidates` has an equal cost. Costs are ranked by
/// [`compare_costs`], so NaN counts as the worst cost. Survivors keep their
/// input order and are pairwise at least `threshold` apart. A non-positive
/// threshold keeps everything.
///
/// A non-empty pool always has at least one survivor: the first candidate
/// with the lowest rank leads every neighbourhood it belongs to.
///
/// # Examples
///
/// ```
/// use u_immune::optainet::suppress;
/// use u_immune::solution::Solution;
///
/// let pool = vec![
///     Solution::with_cost(vec![false, false, false], 5.0),
///     Solution::with_cost(vec![false, false, true], 3.0),
///     Solution::with_cost(vec![true, true, true], 9.0),
/// ];
/// let survivors = suppress(pool, 2.0);
/// assert_eq!(survivors.len(), 2);
/// assert_eq!(survivors[0].values(), &[false, false, true]);
/// assert_eq!(survivors[1].values(), &[true, true, true]);
/// ```
pub fn suppress<G: Gene>(candidates: Vec<Solution<G>>, threshold: f64) -> Vec<Solution<G>> {
    let keep: Vec<bool> = (0..candidates.len())
        .map(|i| leads_neighbourhood(&candidates, i, threshold))
        .collect();

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(s, k)| k.then_some(s))
        .collect()
}

fn leads_neighbourhood<G: Gene>(pool: &[Solution<G>], i: usize, threshold: f64) -> bool {
    let p = &pool[i];
    pool.iter()
        .enumerate()
        .filter(|&(j, q)| j != i && mismatch_distance(p, q) < threshold)
        .all(|(j, q)| match compare_costs(p.cost(), q.cost()) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => i < j,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_neighbourhood_keeps_best() {
        let pool = vec![
            Solution::with_cost(bits("000"), 5.0),
            Solution::with_cost(bits("001"), 3.0),
            Solution::with_cost(bits("111"), 9.0),
        ];
        let survivors = suppress(pool, 2.0);
        let kept: Vec<_> = survivors.iter().map(|s| s.values().to_vec()).collect();
        assert_eq!(kept, vec![bits("001"), bits("111")]);
    }

    #[test]
    fn test_neighbour_test_is_strict() {
        // distance exactly 1 is not below a threshold of 1
        let pool = vec![
            Solution::with_cost(bits("00"), 1.0),
            Solution::with_cost(bits("01"), 0.0),
        ];
        assert_eq!(suppress(pool, 1.0).len(), 2);
    }

    #[test]
    fn test_exact_duplicates_collapse_to_first() {
        let pool = vec![
            Solution::with_cost(bits("10"), 2.0),
            Solution::with_cost(bits("01"), 2.0),
            Solution::with_cost(bits("10"), 2.0),
            Solution::with_cost(bits("01"), 2.0),
        ];
        let survivors = suppress(pool, 1.0);
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].values(), bits("10").as_slice());
        assert_eq!(survivors[1].values(), bits("01").as_slice());
    }

    #[test]
    fn test_equal_cost_neighbours_favour_earlier() {
        let pool = vec![
            Solution::with_cost(bits("110"), 1.0),
            Solution::with_cost(bits("111"), 1.0),
        ];
        let survivors = suppress(pool, 2.0);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].values(), bits("110").as_slice());
    }

    #[test]
    fn test_non_positive_threshold_keeps_all() {
        let pool = vec![
            Solution::with_cost(bits("0"), 1.0),
            Solution::with_cost(bits("0"), 0.0),
        ];
        assert_eq!(suppress(pool.clone(), 0.0).len(), 2);
        assert_eq!(suppress(pool, -1.0).len(), 2);
    }

    #[test]
    fn test_real_valued_distance_is_exact() {
        let a = Solution::new(vec![1.0, 2.0]);
        let b = Solution::new(vec![1.0, 2.000_000_1]);
        assert_eq!(mismatch_distance(&a, &a), 0.0);
        assert_eq!(mismatch_distance(&a, &b), 1.0);
    }

    #[test]
    fn test_nan_cost_ranks_worst() {
        // all three are neighbours; NaN must not break the ordering
        let pool = vec![
            Solution::with_cost(bits("00"), 1.0),
            Solution::with_cost(bits("01"), f64::NAN),
            Solution::with_cost(bits("11"), 0.0),
        ];
        let survivors = suppress(pool, 10.0);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].cost(), 0.0);
    }

    #[test]
    fn test_all_nan_pool_keeps_first() {
        let pool = vec![
            Solution::with_cost(bits("10"), f64::NAN),
            Solution::with_cost(bits("01"), f64::NAN),
        ];
        let survivors = suppress(pool, 10.0);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].values(), bits("10").as_slice());
    }

    #[test]
    fn test_empty_pool() {
        assert!(suppress(Vec::<Solution<bool>>::new(), 3.0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_survivors_are_separated(
            pool in prop::collection::vec(
                (prop::collection::vec(any::<bool>(), 6), 0u8..8),
                1..40
            ),
            threshold in 0.0f64..4.0
        ) {
            let candidates: Vec<_> = pool
                .into_iter()
                .map(|(v, c)| Solution::with_cost(v, f64::from(c)))
                .collect();
            let survivors = suppress(candidates, threshold);
            for (i, a) in survivors.iter().enumerate() {
                for b in &survivors[i + 1..] {
                    prop_assert!(mismatch_distance(a, b) >= threshold);
                }
            }
        }

        #[test]
        fn prop_first_minimum_survives(
            pool in prop::collection::vec(
                (prop::collection::vec(any::<bool>(), 5), 0u8..6),
                1..40
            ),
            threshold in 0.0f64..6.0
        ) {
            let candidates: Vec<_> = pool
                .into_iter()
                .map(|(v, c)| Solution::with_cost(v, f64::from(c)))
                .collect();
            let best = candidates
                .iter()
                .min_by(|a, b| a.cost().partial_cmp(&b.cost()).unwrap())
                .cloned()
                .unwrap();
            let survivors = suppress(candidates, threshold);
            prop_assert!(survivors.iter().any(|s| s == &best));
        }

        #[test]
        fn prop_nan_costs_never_empty_the_pool(
            pool in prop::collection::vec(
                (prop::collection::vec(any::<bool>(), 4), prop::option::of(0u8..4)),
                1..30
            ),
            threshold in 0.0f64..8.0
        ) {
            let candidates: Vec<_> = pool
                .into_iter()
                .map(|(v, c)| Solution::with_cost(v, c.map_or(f64::NAN, f64::from)))
                .collect();
            let survivors = suppress(candidates, threshold);
            prop_assert!(!survivors.is_empty());
            for (i, a) in survivors.iter().enumerate() {
                for b in &survivors[i + 1..] {
                    prop_assert!(mismatch_distance(a, b) >= threshold);
                }
            }
        }
    }
}
