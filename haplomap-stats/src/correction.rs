//! Multiple testing correction across the locations of one pass.
//!
//! A heatmap tests every province at once, so a handful of "significant"
//! provinces is expected by chance alone. The adjusted values produced here
//! are reported alongside the raw p-value as `q_value`.

use haplomap_core::{HaplomapError, Result};

/// Multiple testing correction method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CorrectionMethod {
    /// No correction; q-values equal the raw p-values.
    None,
    /// Bonferroni correction — controls family-wise error rate (FWER).
    Bonferroni,
    /// Benjamini-Hochberg procedure — controls false discovery rate (FDR).
    #[default]
    BenjaminiHochberg,
}

/// Apply a multiple testing correction to `p_values`.
///
/// Output order matches input order.
pub fn correct(p_values: &[f64], method: CorrectionMethod) -> Result<Vec<f64>> {
    match method {
        CorrectionMethod::None => {
            check_range(p_values)?;
            Ok(p_values.to_vec())
        }
        CorrectionMethod::Bonferroni => bonferroni(p_values),
        CorrectionMethod::BenjaminiHochberg => benjamini_hochberg(p_values),
    }
}

/// Bonferroni correction: `min(p * m, 1)`.
pub fn bonferroni(p_values: &[f64]) -> Result<Vec<f64>> {
    check_range(p_values)?;
    let m = p_values.len() as f64;
    Ok(p_values.iter().map(|&p| (p * m).min(1.0)).collect())
}

/// Benjamini-Hochberg step-up adjustment.
///
/// The i-th smallest p-value becomes `min_{j >= i} p_(j) * m / j`, capped at 1.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    check_range(p_values)?;
    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut q = vec![1.0; m];
    let mut running_min = 1.0_f64;
    for (pos, &idx) in order.iter().enumerate().rev() {
        let scaled = p_values[idx] * m as f64 / (pos + 1) as f64;
        running_min = running_min.min(scaled);
        q[idx] = running_min;
    }
    Ok(q)
}

fn check_range(p_values: &[f64]) -> Result<()> {
    match p_values.iter().position(|p| !(0.0..=1.0).contains(p)) {
        Some(i) => Err(HaplomapError::InvalidInput(format!(
            "p-value at index {i} is out of range [0, 1]: {}",
            p_values[i]
        ))),
        None => Ok(()),
    }
}
