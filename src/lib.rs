//! Interactive variography: experimental variograms, nested theoretical
//! models, model fitting and ordinary kriging, driven by widget state.
//!
//! The [`session`] module is the entry point for interactive use: it owns a
//! shared [`samples::SampleSet`], a handful of widget values and recomputes
//! plot-ready frames whenever a widget changes. Everything numeric lives in
//! [`variography`] and [`kriging`].

pub mod geometry;
pub mod kriging;
pub mod samples;
pub mod session;
pub mod variography;

pub mod prelude {

    pub mod re_exports {
        pub use nalgebra;
        pub use rstar;
    }

    pub use crate::geometry::{sph2cart, Ellipsoid};
    pub use crate::kriging::{ordinary_kriging_at, ordinary_kriging_grid, SearchParams};
    pub use crate::samples::SampleSet;
    pub use crate::session::Session;
    pub use crate::variography::experimental::{directional_variogram, empirical_variogram};
    pub use crate::variography::fitting::{fit, fit_best};
    pub use crate::variography::models::{ModelKind, NestedModel, Structure, VariogramParameters};
}
