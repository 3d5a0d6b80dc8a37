use nalgebra::UnitVector3;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::geometry::sph2cart;
use crate::samples::SampleSet;

use super::ParameterError;

/// Default angular half-window for directional pair acceptance, degrees.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 22.5;

/// One separation-distance bin, `[lb, ub)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagBounds {
    pub lb: f64,
    pub ub: f64,
}

impl LagBounds {
    pub fn new(lb: f64, ub: f64) -> Self {
        Self { lb, ub }
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.lb + self.ub)
    }

    pub fn contains(&self, dist: f64) -> bool {
        dist >= self.lb && dist < self.ub
    }

    /// Split `[0, max_lag)` into `count` equal bins.
    pub fn regular(max_lag: f64, count: usize) -> Vec<Self> {
        let width = max_lag / count as f64;
        (0..count)
            .map(|i| Self::new(i as f64 * width, (i + 1) as f64 * width))
            .collect()
    }
}

/// Widget-facing request for a directional experimental variogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalQuery {
    pub azimuth: f64,
    pub dip: f64,
    pub max_lag: f64,
    pub lag_count: usize,
    /// Angular half-window about the direction, degrees.
    pub angle_tolerance: f64,
    /// Cap on the lateral offset from the direction axis; infinite by default.
    pub bandwidth: f64,
}

impl DirectionalQuery {
    pub fn new(
        azimuth: f64,
        dip: f64,
        max_lag: f64,
        lag_count: usize,
    ) -> Result<Self, ParameterError> {
        if !(0.0..360.0).contains(&azimuth) {
            return Err(ParameterError::AzimuthOutOfRange(azimuth));
        }
        if !(-90.0..=90.0).contains(&dip) {
            return Err(ParameterError::DipOutOfRange(dip));
        }
        if max_lag <= 0.0 {
            return Err(ParameterError::NonPositiveMaxLag(max_lag));
        }
        if lag_count == 0 {
            return Err(ParameterError::ZeroLagCount);
        }
        Ok(Self {
            azimuth,
            dip,
            max_lag,
            lag_count,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            bandwidth: f64::INFINITY,
        })
    }

    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance = degrees;
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn direction(&self) -> UnitVector3<f64> {
        sph2cart(self.azimuth, self.dip)
    }
}

/// Binned semivariances. Empty bins carry NaN semivariance and zero count.
#[derive(Debug, Clone)]
pub struct EmpiricalVariogram {
    /// None for an omnidirectional variogram.
    pub direction: Option<UnitVector3<f64>>,
    pub lags: Vec<LagBounds>,
    pub semivariance: Vec<f64>,
    pub counts: Vec<usize>,
}

impl EmpiricalVariogram {
    pub fn lag_centers(&self) -> Vec<f64> {
        self.lags.iter().map(|l| l.center()).collect()
    }
}

/// Omnidirectional experimental variogram over `[0, max_lag)` in `lag_count` bins.
pub fn empirical_variogram(
    samples: &SampleSet,
    max_lag: f64,
    lag_count: usize,
) -> Result<EmpiricalVariogram, ParameterError> {
    if max_lag <= 0.0 {
        return Err(ParameterError::NonPositiveMaxLag(max_lag));
    }
    if lag_count == 0 {
        return Err(ParameterError::ZeroLagCount);
    }

    let lags = LagBounds::regular(max_lag, lag_count);
    let (semivariance, counts) = accumulate(samples, &lags, |_| true);

    Ok(EmpiricalVariogram {
        direction: None,
        lags,
        semivariance,
        counts,
    })
}

/// Directional experimental variogram; pairs are sense-insensitive.
pub fn directional_variogram(
    samples: &SampleSet,
    query: &DirectionalQuery,
) -> Result<EmpiricalVariogram, ParameterError> {
    let direction = query.direction();
    let axis = direction.into_inner();
    let cos_tol = query.angle_tolerance.to_radians().cos();
    let bandwidth = query.bandwidth;

    let lags = LagBounds::regular(query.max_lag, query.lag_count);
    let (semivariance, counts) = accumulate(samples, &lags, |sep| {
        let dist = sep.norm();
        if dist == 0.0 {
            return false;
        }
        // |cos| folds h and -h onto the same direction
        let along = sep.dot(&axis);
        if along.abs() / dist < cos_tol {
            return false;
        }
        let lateral_sq = dist * dist - along * along;
        lateral_sq.max(0.0).sqrt() <= bandwidth
    });

    Ok(EmpiricalVariogram {
        direction: Some(direction),
        lags,
        semivariance,
        counts,
    })
}

/// Sweep lag bins in parallel; within a bin pairs accumulate in a fixed
/// order, so repeated runs reproduce bit-identical semivariances.
fn accumulate<F>(samples: &SampleSet, lags: &[LagBounds], accept: F) -> (Vec<f64>, Vec<usize>)
where
    F: Fn(&nalgebra::Vector3<f64>) -> bool + Sync,
{
    let points = &samples.points;
    let values = &samples.values;
    let n = points.len();

    let per_bin = lags
        .par_iter()
        .map(|lag| {
            let mut count = 0usize;
            let mut semivariance = 0f64;

            for i in 0..n {
                for j in (i + 1)..n {
                    let sep = points[j] - points[i];
                    if !lag.contains(sep.norm()) {
                        continue;
                    }
                    if !accept(&sep) {
                        continue;
                    }

                    let dv = values[i] - values[j];
                    semivariance += dv * dv;
                    count += 1;
                }
            }

            if count == 0 {
                (f64::NAN, 0)
            } else {
                (semivariance / (2.0 * count as f64), count)
            }
        })
        .collect::<Vec<_>>();

    per_bin.into_iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn query_validates_ranges() {
        assert!(DirectionalQuery::new(0.0, 0.0, 10.0, 10).is_ok());
        assert!(matches!(
            DirectionalQuery::new(360.0, 0.0, 10.0, 10),
            Err(ParameterError::AzimuthOutOfRange(_))
        ));
        assert!(matches!(
            DirectionalQuery::new(0.0, 91.0, 10.0, 10),
            Err(ParameterError::DipOutOfRange(_))
        ));
        assert!(matches!(
            DirectionalQuery::new(0.0, 0.0, 0.0, 10),
            Err(ParameterError::NonPositiveMaxLag(_))
        ));
        assert!(matches!(
            DirectionalQuery::new(0.0, 0.0, 10.0, 0),
            Err(ParameterError::ZeroLagCount)
        ));
    }

    #[test]
    fn collinear_triplet_by_hand() {
        use nalgebra::Point3;
        let samples = crate::samples::SampleSet::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![0.0, 1.0, 3.0],
        );

        let vgram = empirical_variogram(&samples, 3.0, 3).unwrap();

        // d = 1 pairs: (0,1) and (1,3); d = 2 pair: (0,3)
        assert_eq!(vgram.counts, vec![0, 2, 1]);
        assert!(vgram.semivariance[0].is_nan());
        assert_relative_eq!(vgram.semivariance[1], (1.0 + 4.0) / 4.0);
        assert_relative_eq!(vgram.semivariance[2], 9.0 / 2.0);
    }

    #[test]
    fn directional_picks_axis_pairs_only() {
        // 3x3 unit grid, value = x, so east-west pairs differ and
        // north-south pairs at the same x are identical
        use nalgebra::Point3;
        let mut points = Vec::new();
        let mut values = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                points.push(Point3::new(i as f64, j as f64, 0.0));
                values.push(i as f64);
            }
        }
        let samples = crate::samples::SampleSet::new(points, values);

        let east = DirectionalQuery::new(90.0, 0.0, 2.5, 2)
            .unwrap()
            .with_angle_tolerance(10.0);
        let north = DirectionalQuery::new(0.0, 0.0, 2.5, 2)
            .unwrap()
            .with_angle_tolerance(10.0);

        let ew = directional_variogram(&samples, &east).unwrap();
        let ns = directional_variogram(&samples, &north).unwrap();

        // 6 east-west pairs at d = 1, each with squared difference 1
        assert_eq!(ew.counts[0], 6);
        assert_relative_eq!(ew.semivariance[0], 0.5);

        // north-south pairs never differ
        assert_eq!(ns.counts[0], 6);
        assert_relative_eq!(ns.semivariance[0], 0.0);
    }

    #[test]
    fn opposite_azimuths_agree() {
        let samples = crate::samples::SampleSet::regular_grid(6, 6, 1.0, 99);

        let a = directional_variogram(
            &samples,
            &DirectionalQuery::new(45.0, 0.0, 4.0, 8).unwrap(),
        )
        .unwrap();
        let b = directional_variogram(
            &samples,
            &DirectionalQuery::new(225.0, 0.0, 4.0, 8).unwrap(),
        )
        .unwrap();

        assert_eq!(a.counts, b.counts);
        for (x, y) in a.semivariance.iter().zip(b.semivariance.iter()) {
            if x.is_nan() {
                assert!(y.is_nan());
            } else {
                assert_relative_eq!(*x, *y);
            }
        }
    }

    #[test]
    fn seeded_grid_variogram_is_reproducible() {
        let samples = crate::samples::SampleSet::regular_grid(5, 5, 1.0, 42);

        let first = empirical_variogram(&samples, 5.0, 5).unwrap();
        let second = empirical_variogram(&samples, 5.0, 5).unwrap();

        assert_eq!(first.lags.len(), 5);
        assert_eq!(first.counts, second.counts);
        for (a, b) in first
            .semivariance
            .iter()
            .zip(second.semivariance.iter())
        {
            if a.is_nan() {
                assert!(b.is_nan());
            } else {
                assert_eq!(a, b);
            }
        }

        // unit grid, max lag 5: every bin but the sub-unit one has pairs
        assert_eq!(first.counts[0], 0);
        assert!(first.counts[1..].iter().all(|&c| c > 0));
    }
}
