// Find and return the highest scoring element of the set.
// If multiple elements have the highest score, the first one wins.
// Constraints:
//   - Don't call the scoring function more than once per element.
//   - Don't allocate; the selection runs once per tree level per iteration.
pub(super) fn first_best<T, F: Fn(&T) -> f64>(set: &[T], score_fn: F) -> Option<&T> {
    let mut best_score = f64::NEG_INFINITY;
    let mut best = None;
    for item in set {
        let score = score_fn(item);
        debug_assert!(!score.is_nan());
        if best.is_none() || score > best_score {
            best_score = score;
            best = Some(item);
        }
    }
    best
}
