//! Multiple-importance-sampling weight functions (spec §4.7, §4.9.2).
//! The direct-lighting estimator uses the power heuristic (β=2); BPT's
//! multi-strategy connection weight uses the balance heuristic (β=1),
//! matching spec §4.9.2's explicit choice of the two named heuristics per
//! estimator rather than one shared β.

use num_traits::Float;

/// β=2 power heuristic for a single pair of strategies (spec §4.7).
pub fn power_heuristic<T: Float>(pdf_a: T, pdf_b: T) -> T {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    let denom = a2 + b2;
    if denom <= T::zero() {
        T::zero()
    } else {
        a2 / denom
    }
}

/// β=1 balance heuristic over an arbitrary number of candidate
/// strategies, `pdfs[i]` all in the same measure as `pdf_self` (spec
/// §4.9.2's BPT connection weight, which sums over every other valid
/// `(s,t)` splitting of the same path).
pub fn balance_heuristic<T: Float>(pdf_self: T, pdfs: impl Iterator<Item = T>) -> T {
    let total: T = pdfs.fold(pdf_self, |acc, p| acc + p);
    if total <= T::zero() {
        T::zero()
    } else {
        pdf_self / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_heuristic_equal_pdfs_gives_half() {
        assert!((power_heuristic(1.0_f64, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn power_heuristic_favors_larger_pdf() {
        let w = power_heuristic(2.0_f64, 1.0);
        assert!(w > 0.5);
    }

    #[test]
    fn balance_heuristic_matches_fraction() {
        let w = balance_heuristic(2.0_f64, [1.0, 1.0].into_iter());
        assert!((w - 0.5).abs() < 1e-12);
    }
}
