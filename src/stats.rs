use crate::Money;

pub const MEDRANGE_PCTS: [u8; 7] = [0, 5, 25, 50, 75, 95, 100];

// (Copied from nightly-only rust https://doc.rust-lang.org/test/stats/trait.Stats.html)
// Helper function: extract a value representing the `pct` percentile of a sorted sample-set, using
// linear interpolation. If samples are not sorted, return nonsensical value.
pub fn percentile_of_sorted(sorted_samples: &[Money], pct: u8) -> Money {
    assert!(!sorted_samples.is_empty());
    if sorted_samples.len() == 1 {
        return sorted_samples[0];
    }
    assert!(pct <= 100);
    if pct == 100 {
        return sorted_samples[sorted_samples.len() - 1];
    }
    let length = (sorted_samples.len() - 1) as f64;
    let rank = (pct as f64 / 100.0) * length;
    let lrank = rank.floor();
    let d = rank - lrank;
    let n = lrank as usize;
    let lo = sorted_samples[n];
    let hi = sorted_samples[n + 1];
    lo + (hi - lo) * d
}

/// Per-round percentiles (see `MEDRANGE_PCTS`) across simulations.
///
/// A simulation that ended early holds its last value for the remaining rounds. Empty series
/// count as zero.
pub fn medrange(sims: &[Vec<Money>]) -> Vec<Vec<Money>> {
    let max_len = sims.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![Vec::with_capacity(max_len); MEDRANGE_PCTS.len()];
    if sims.is_empty() {
        return out;
    }
    for i in 0..max_len {
        let mut vals: Vec<Money> = sims
            .iter()
            .map(|s| {
                if i < s.len() {
                    s[i]
                } else {
                    s.last().copied().unwrap_or(0.0)
                }
            })
            .collect();
        vals.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for (row, pct) in out.iter_mut().zip(MEDRANGE_PCTS.iter()) {
            row.push(percentile_of_sorted(&vals, *pct));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{medrange, percentile_of_sorted};

    #[test]
    fn percentiles() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile_of_sorted(&v, 0), 0.0);
        assert_eq!(percentile_of_sorted(&v, 50), 20.0);
        assert_eq!(percentile_of_sorted(&v, 100), 40.0);
        assert_eq!(percentile_of_sorted(&v, 25), 10.0);
        assert_eq!(percentile_of_sorted(&[7.0], 95), 7.0);
        // interpolated
        assert!((percentile_of_sorted(&[0.0, 10.0], 5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn medrange_pads_short_sims() {
        let sims = vec![vec![1.0, 2.0, 3.0], vec![5.0], vec![-1.0, 0.0, 9.0]];
        let out = medrange(&sims);
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|row| row.len() == 3));
        // round 0: -1, 1, 5
        assert_eq!(out[0][0], -1.0);
        assert_eq!(out[3][0], 1.0);
        assert_eq!(out[6][0], 5.0);
        // round 2: 3, 5 (held), 9
        assert_eq!(out[3][2], 5.0);
        assert_eq!(out[6][2], 9.0);
    }

    #[test]
    fn medrange_empty() {
        assert!(medrange(&[]).iter().all(|row| row.is_empty()));
    }
}
