use std::cmp::Ordering;

/// Indices of the `k` largest scores, best first.
///
/// Equal scores keep ascending index order. NaN ranks below every number and `-0.0` ties
/// with `0.0`. Only the `k` winners get fully sorted, the rest of the vector is just partitioned.
#[must_use]
pub fn top_k(scores: &[f32], k: usize) -> Vec<usize> {
	let k = k.min(scores.len());
	if k == 0 {
		return Vec::new();
	}

	let by_rank = |a: &usize, b: &usize| compare(scores[*a], scores[*b]).then_with(|| a.cmp(b));

	let mut indices = (0..scores.len()).collect::<Vec<_>>();
	if k < indices.len() {
		indices.select_nth_unstable_by(k - 1, by_rank);
		indices.truncate(k);
	}
	indices.sort_unstable_by(by_rank);

	indices
}

/// Descending order over a NaN-free projection of the scores
fn compare(a: f32, b: f32) -> Ordering {
	rank_key(b).total_cmp(&rank_key(a))
}

fn rank_key(score: f32) -> f32 {
	if score.is_nan() {
		f32::NEG_INFINITY
	} else {
		// Folds -0.0 into 0.0, total_cmp would order them apart
		score + 0.0
	}
}
