use super::ParameterError;

/// Elementary variogram structure families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Gaussian,
    Spherical,
    Exponential,
    Pentaspherical,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Gaussian,
        ModelKind::Spherical,
        ModelKind::Exponential,
        ModelKind::Pentaspherical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Gaussian => "gaussian",
            ModelKind::Spherical => "spherical",
            ModelKind::Exponential => "exponential",
            ModelKind::Pentaspherical => "pentaspherical",
        }
    }

    /// Unit shape g(u) with u = h / range: 0 at u = 0, rising toward 1.
    ///
    /// Spherical and pentaspherical reach 1 exactly at u >= 1; exponential
    /// and gaussian approach it asymptotically (~0.95 at u = 1, the
    /// practical-range convention).
    fn shape(&self, u: f64) -> f64 {
        match self {
            ModelKind::Gaussian => 1.0 - (-3.0 * u * u).exp(),
            ModelKind::Spherical => {
                if u < 1.0 {
                    1.5 * u - 0.5 * u.powi(3)
                } else {
                    1.0
                }
            }
            ModelKind::Exponential => 1.0 - (-3.0 * u).exp(),
            ModelKind::Pentaspherical => {
                if u < 1.0 {
                    1.875 * u - 1.25 * u.powi(3) + 0.375 * u.powi(5)
                } else {
                    1.0
                }
            }
        }
    }
}

/// One nugget-free component of a nested model: its sill contribution and range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Structure {
    pub kind: ModelKind,
    pub sill: f64,
    pub range: f64,
}

impl Structure {
    pub fn new(kind: ModelKind, sill: f64, range: f64) -> Result<Self, ParameterError> {
        if sill < 0.0 {
            return Err(ParameterError::NegativeSill(sill));
        }
        if range <= 0.0 {
            return Err(ParameterError::NonPositiveRange(range));
        }
        Ok(Self { kind, sill, range })
    }

    pub fn variogram(&self, h: f64) -> f64 {
        self.sill * self.kind.shape(h / self.range)
    }

    pub fn covariogram(&self, h: f64) -> f64 {
        self.sill - self.variogram(h)
    }
}

/// Sum of elementary structures plus a single nugget term.
///
/// gamma(0) is exactly 0; the nugget is only approached as h -> 0+.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedModel {
    pub nugget: f64,
    pub structures: Vec<Structure>,
}

impl NestedModel {
    pub fn new(nugget: f64, structures: Vec<Structure>) -> Result<Self, ParameterError> {
        if nugget < 0.0 {
            return Err(ParameterError::NegativeNugget(nugget));
        }
        Ok(Self { nugget, structures })
    }

    pub fn variogram(&self, h: f64) -> f64 {
        if h == 0.0 {
            return 0.0;
        }
        self.nugget + self.structures.iter().map(|s| s.variogram(h)).sum::<f64>()
    }

    /// Total sill: nugget plus all structure contributions.
    pub fn sill(&self) -> f64 {
        self.nugget + self.structures.iter().map(|s| s.sill).sum::<f64>()
    }

    pub fn covariogram(&self, h: f64) -> f64 {
        self.sill() - self.variogram(h)
    }

    /// Longest structure range, 0 for a pure-nugget model.
    pub fn range(&self) -> f64 {
        self.structures.iter().map(|s| s.range).fold(0.0, f64::max)
    }
}

/// Widget-facing parameter set for a single-structure model.
///
/// `sill` is the total sill, nugget included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariogramParameters {
    pub kind: ModelKind,
    pub nugget: f64,
    pub sill: f64,
    pub range: f64,
}

impl VariogramParameters {
    pub fn new(kind: ModelKind, nugget: f64, sill: f64, range: f64) -> Result<Self, ParameterError> {
        if nugget < 0.0 {
            return Err(ParameterError::NegativeNugget(nugget));
        }
        if sill < nugget {
            return Err(ParameterError::SillBelowNugget { sill, nugget });
        }
        if range <= 0.0 {
            return Err(ParameterError::NonPositiveRange(range));
        }
        Ok(Self {
            kind,
            nugget,
            sill,
            range,
        })
    }

    /// Sill contribution above the nugget.
    pub fn partial_sill(&self) -> f64 {
        self.sill - self.nugget
    }

    pub fn to_model(&self) -> NestedModel {
        NestedModel {
            nugget: self.nugget,
            structures: vec![Structure {
                kind: self.kind,
                sill: self.partial_sill(),
                range: self.range,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parameters_validate_invariants() {
        assert!(VariogramParameters::new(ModelKind::Spherical, 0.1, 1.0, 50.0).is_ok());
        assert!(matches!(
            VariogramParameters::new(ModelKind::Spherical, -0.1, 1.0, 50.0),
            Err(ParameterError::NegativeNugget(_))
        ));
        assert!(matches!(
            VariogramParameters::new(ModelKind::Spherical, 1.0, 0.5, 50.0),
            Err(ParameterError::SillBelowNugget { .. })
        ));
        assert!(matches!(
            VariogramParameters::new(ModelKind::Spherical, 0.0, 1.0, 0.0),
            Err(ParameterError::NonPositiveRange(_))
        ));
    }

    #[test]
    fn every_kind_builds_a_model() {
        for kind in ModelKind::ALL {
            let params = VariogramParameters::new(kind, 0.2, 1.2, 30.0).unwrap();
            let model = params.to_model();
            assert_relative_eq!(model.sill(), 1.2, epsilon = 1e-12);
            assert!(model.variogram(10.0) > 0.0);
        }
    }

    #[test]
    fn spherical_plateau_and_origin() {
        let model = VariogramParameters::new(ModelKind::Spherical, 0.25, 1.25, 40.0)
            .unwrap()
            .to_model();

        // exactly 0 at h = 0, not the nugget
        assert_eq!(model.variogram(0.0), 0.0);

        // nugget + sill contribution exactly at and beyond the range
        assert_eq!(model.variogram(40.0), 0.25 + 1.0);
        assert_eq!(model.variogram(400.0), 0.25 + 1.0);
    }

    #[test]
    fn pentaspherical_plateau() {
        let model = VariogramParameters::new(ModelKind::Pentaspherical, 0.0, 2.0, 10.0)
            .unwrap()
            .to_model();

        assert_eq!(model.variogram(10.0), 2.0);
        assert_eq!(model.variogram(25.0), 2.0);
        assert!(model.variogram(5.0) < 2.0);
    }

    #[test]
    fn asymptotic_kinds_near_sill_at_range() {
        for kind in [ModelKind::Exponential, ModelKind::Gaussian] {
            let model = VariogramParameters::new(kind, 0.0, 1.0, 20.0)
                .unwrap()
                .to_model();
            let at_range = model.variogram(20.0);
            assert!(at_range > 0.94 && at_range < 1.0, "{:?}: {}", kind, at_range);
        }
    }

    #[test]
    fn nugget_approached_but_not_realized() {
        let model = VariogramParameters::new(ModelKind::Exponential, 0.5, 1.5, 10.0)
            .unwrap()
            .to_model();

        assert_eq!(model.variogram(0.0), 0.0);
        let near_origin = model.variogram(1e-9);
        assert_relative_eq!(near_origin, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn nested_model_sums_components_plus_nugget() {
        let nugget = 0.25;
        let s1 = Structure::new(ModelKind::Spherical, 1.0, 20.0).unwrap();
        let s2 = Structure::new(ModelKind::Gaussian, 0.5, 60.0).unwrap();
        let nested = NestedModel::new(nugget, vec![s1, s2]).unwrap();

        let range = nested.range();
        assert_eq!(range, 60.0);

        for h in [range / 2.0, range, 2.0 * range] {
            let expected = nugget + s1.variogram(h) + s2.variogram(h);
            assert_relative_eq!(nested.variogram(h), expected, epsilon = 1e-12);
        }
        assert_eq!(nested.variogram(0.0), 0.0);
        assert_relative_eq!(nested.sill(), 1.75);
    }

    #[test]
    fn covariogram_complements_variogram() {
        let model = VariogramParameters::new(ModelKind::Spherical, 0.1, 1.1, 15.0)
            .unwrap()
            .to_model();

        for h in [0.5, 5.0, 15.0, 30.0] {
            assert_relative_eq!(
                model.covariogram(h),
                model.sill() - model.variogram(h),
                epsilon = 1e-12
            );
        }
    }
}
