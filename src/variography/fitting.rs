use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use itertools::izip;
use ordered_float::OrderedFloat;

use super::experimental::EmpiricalVariogram;
use super::models::{ModelKind, VariogramParameters};

#[derive(Debug, Clone)]
pub enum FitError {
    /// Fewer than three populated lag bins to fit against.
    NoValidLags(usize),
    /// Every populated bin has zero semivariance.
    FlatSemivariance,
}

impl Display for FitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FitError::NoValidLags(found) => {
                write!(f, "Need at least 3 populated lag bins, found {}", found)
            }
            FitError::FlatSemivariance => write!(f, "All semivariances are zero"),
        }
    }
}

impl std::error::Error for FitError {}

/// Outcome of a weighted least-squares fit.
#[derive(Debug, Clone, Copy)]
pub struct FittedModel {
    pub params: VariogramParameters,
    /// Pair-count-weighted residual sum of squares; lower is better.
    pub weighted_rss: f64,
}

// grid resolution of the parameter search
const NUGGET_STEPS: usize = 10;
const SILL_STEPS: usize = 10;
const RANGE_STEPS: usize = 20;

/// Fit one model kind to an experimental variogram.
///
/// Deterministic grid search over (nugget, sill, range), residuals weighted
/// by pair counts so well-populated bins dominate. The nugget is searched up
/// to half the largest semivariance, the range up to twice the largest lag.
pub fn fit(empirical: &EmpiricalVariogram, kind: ModelKind) -> Result<FittedModel, FitError> {
    let valid: Vec<(f64, f64, usize)> = izip!(
        empirical.lags.iter(),
        empirical.semivariance.iter(),
        empirical.counts.iter()
    )
    .filter(|(_, sv, cnt)| sv.is_finite() && **cnt > 0)
    .map(|(lag, sv, cnt)| (lag.center(), *sv, *cnt))
    .collect();

    if valid.len() < 3 {
        return Err(FitError::NoValidLags(valid.len()));
    }

    let max_lag = valid
        .iter()
        .map(|(lag, _, _)| OrderedFloat(*lag))
        .max()
        .map(|x| x.0)
        .unwrap_or(0.0);
    let max_sv = valid
        .iter()
        .map(|(_, sv, _)| OrderedFloat(*sv))
        .max()
        .map(|x| x.0)
        .unwrap_or(0.0);

    if max_sv <= 0.0 {
        return Err(FitError::FlatSemivariance);
    }

    let mut best: Option<FittedModel> = None;

    for i in 0..=NUGGET_STEPS {
        let nugget = max_sv * i as f64 / (2.0 * NUGGET_STEPS as f64);
        for j in 1..=SILL_STEPS {
            let sill = max_sv * j as f64 / SILL_STEPS as f64;
            if sill < nugget {
                continue;
            }
            for k in 1..=RANGE_STEPS {
                let range = 2.0 * max_lag * k as f64 / RANGE_STEPS as f64;

                let Ok(params) = VariogramParameters::new(kind, nugget, sill, range) else {
                    continue;
                };
                let model = params.to_model();

                let mut rss = 0.0;
                for &(lag, sv, cnt) in &valid {
                    let residual = sv - model.variogram(lag);
                    rss += cnt as f64 * residual * residual;
                }

                if best.as_ref().map_or(true, |b| rss < b.weighted_rss) {
                    best = Some(FittedModel {
                        params,
                        weighted_rss: rss,
                    });
                }
            }
        }
    }

    // grid always visits at least one valid combination
    best.ok_or(FitError::FlatSemivariance)
}

/// Fit every model kind and keep the lowest weighted RSS.
pub fn fit_best(empirical: &EmpiricalVariogram) -> Result<FittedModel, FitError> {
    let mut best: Option<FittedModel> = None;
    let mut last_err = None;

    for kind in ModelKind::ALL {
        match fit(empirical, kind) {
            Ok(fitted) => {
                if best
                    .as_ref()
                    .map_or(true, |b| fitted.weighted_rss < b.weighted_rss)
                {
                    best = Some(fitted);
                }
            }
            Err(e) => last_err = Some(e),
        }
    }

    best.ok_or_else(|| last_err.unwrap_or(FitError::FlatSemivariance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variography::experimental::LagBounds;
    use crate::variography::models::NestedModel;

    fn synthetic_empirical(model: &NestedModel, max_lag: f64, bins: usize) -> EmpiricalVariogram {
        let lags = LagBounds::regular(max_lag, bins);
        let semivariance = lags.iter().map(|l| model.variogram(l.center())).collect();
        let counts = vec![10; bins];
        EmpiricalVariogram {
            direction: None,
            lags,
            semivariance,
            counts,
        }
    }

    #[test]
    fn recovers_spherical_parameters_approximately() {
        let truth = VariogramParameters::new(ModelKind::Spherical, 0.0, 1.0, 6.0)
            .unwrap()
            .to_model();
        let empirical = synthetic_empirical(&truth, 12.0, 12);

        let fitted = fit(&empirical, ModelKind::Spherical).unwrap();

        assert!(fitted.params.nugget < 0.2, "nugget {}", fitted.params.nugget);
        assert!(
            (fitted.params.sill - 1.0).abs() < 0.2,
            "sill {}",
            fitted.params.sill
        );
        assert!(
            (fitted.params.range - 6.0).abs() < 2.0,
            "range {}",
            fitted.params.range
        );
    }

    #[test]
    fn best_fit_is_no_worse_than_single_kind() {
        let truth = VariogramParameters::new(ModelKind::Exponential, 0.1, 1.1, 8.0)
            .unwrap()
            .to_model();
        let empirical = synthetic_empirical(&truth, 16.0, 10);

        let single = fit(&empirical, ModelKind::Spherical).unwrap();
        let best = fit_best(&empirical).unwrap();

        assert!(best.weighted_rss <= single.weighted_rss);
    }

    #[test]
    fn too_few_bins_is_an_error() {
        let lags = LagBounds::regular(4.0, 4);
        let empirical = EmpiricalVariogram {
            direction: None,
            lags,
            semivariance: vec![0.5, f64::NAN, f64::NAN, f64::NAN],
            counts: vec![3, 0, 0, 0],
        };

        assert!(matches!(
            fit(&empirical, ModelKind::Spherical),
            Err(FitError::NoValidLags(1))
        ));
    }

    #[test]
    fn flat_variogram_is_an_error() {
        let lags = LagBounds::regular(4.0, 4);
        let empirical = EmpiricalVariogram {
            direction: None,
            lags,
            semivariance: vec![0.0; 4],
            counts: vec![5; 4],
        };

        assert!(matches!(
            fit(&empirical, ModelKind::Gaussian),
            Err(FitError::FlatSemivariance)
        ));
    }
}
