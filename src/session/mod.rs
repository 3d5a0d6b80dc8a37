//! Recompute-on-change session tying widget state to derived plot frames.
//!
//! The dependency graph is a DAG from widget values to frames: any setter
//! marks the session dirty, and the next [`Session::frames`] call rebuilds
//! every derived frame from scratch. The sample set is shared read-only.

use std::error::Error;
use std::sync::Arc;

use nalgebra::Point3;

use crate::geometry::Ellipsoid;
use crate::kriging::{GridSpec, SearchParams};
use crate::samples::SampleSet;
use crate::variography::experimental::DirectionalQuery;
use crate::variography::models::{ModelKind, VariogramParameters};

pub mod mapper;
pub mod render;
pub mod widgets;

use render::Frame;
use widgets::{Checkbox, Select, Slider};

// estimation grid resolution per axis
const GRID_RES: usize = 32;

pub struct Session {
    samples: Arc<SampleSet>,

    model_kind: Select<ModelKind>,
    nugget: Slider,
    partial_sill: Slider,
    range: Slider,
    azimuth: Slider,
    dip: Slider,
    max_lag: Slider,
    lag_count: Slider,
    directional: Checkbox,
    overlay_fit: Checkbox,
    show_kriging: Checkbox,
    show_variance: Checkbox,

    dirty: bool,
    frames: Vec<Frame>,
}

impl Session {
    /// Build a session over a loaded sample set. Slider bounds are example
    /// defaults derived from the data extent and attribute variance, not
    /// contractual limits.
    pub fn new(samples: Arc<SampleSet>) -> Self {
        let (min, max) = bounds(&samples);
        let diag = ((max - min).norm()).max(1.0);
        let var = {
            let v = samples.variance();
            if v.is_finite() && v > 0.0 {
                v
            } else {
                1.0
            }
        };

        Self {
            samples,
            model_kind: Select::new(ModelKind::ALL.to_vec(), 1),
            nugget: Slider::new(0.0, var, var / 20.0, 0.0),
            partial_sill: Slider::new(0.0, 2.0 * var, var / 20.0, var),
            range: Slider::new(diag / 50.0, diag, diag / 50.0, diag / 4.0),
            azimuth: Slider::new(0.0, 355.0, 5.0, 0.0),
            dip: Slider::new(-90.0, 90.0, 5.0, 0.0),
            max_lag: Slider::new(diag / 20.0, diag, diag / 20.0, diag / 2.0),
            lag_count: Slider::new(2.0, 30.0, 1.0, 10.0),
            directional: Checkbox::default(),
            overlay_fit: Checkbox::default(),
            show_kriging: Checkbox::default(),
            show_variance: Checkbox::default(),
            dirty: true,
            frames: Vec::new(),
        }
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_model_kind(&mut self, kind: ModelKind) {
        self.dirty |= self.model_kind.select(kind);
    }

    pub fn set_nugget(&mut self, value: f64) {
        self.dirty |= self.nugget.set(value);
    }

    pub fn set_partial_sill(&mut self, value: f64) {
        self.dirty |= self.partial_sill.set(value);
    }

    pub fn set_range(&mut self, value: f64) {
        self.dirty |= self.range.set(value);
    }

    pub fn set_azimuth(&mut self, value: f64) {
        self.dirty |= self.azimuth.set(value);
    }

    pub fn set_dip(&mut self, value: f64) {
        self.dirty |= self.dip.set(value);
    }

    pub fn set_max_lag(&mut self, value: f64) {
        self.dirty |= self.max_lag.set(value);
    }

    pub fn set_lag_count(&mut self, value: usize) {
        self.dirty |= self.lag_count.set(value as f64);
    }

    pub fn set_directional(&mut self, on: bool) {
        self.dirty |= self.directional.set(on);
    }

    pub fn set_overlay_fit(&mut self, on: bool) {
        self.dirty |= self.overlay_fit.set(on);
    }

    pub fn set_show_kriging(&mut self, on: bool) {
        self.dirty |= self.show_kriging.set(on);
    }

    pub fn set_show_variance(&mut self, on: bool) {
        self.dirty |= self.show_variance.set(on);
    }

    /// Current frames, recomputed first if any widget changed since the last
    /// call. Errors from the geostatistics layer propagate untranslated and
    /// leave the session dirty.
    pub fn frames(&mut self) -> Result<&[Frame], Box<dyn Error>> {
        if self.dirty {
            self.recompute()?;
        }
        Ok(&self.frames)
    }

    fn recompute(&mut self) -> Result<(), Box<dyn Error>> {
        let kind = self.model_kind.selected();
        let nugget = self.nugget.value();
        let range = self.range.value();
        let params =
            VariogramParameters::new(kind, nugget, nugget + self.partial_sill.value(), range)?;

        let max_lag = self.max_lag.value();
        let lag_count = self.lag_count.value() as usize;

        let mut frames = Vec::new();
        frames.push(Frame::Plot(mapper::theoretical_frame(&params, max_lag)));

        let (mut experimental, vgram) = if self.directional.checked() {
            let query = DirectionalQuery::new(
                self.azimuth.value(),
                self.dip.value(),
                max_lag,
                lag_count,
            )?;
            mapper::directional_frame(&self.samples, &query)?
        } else {
            mapper::omnidirectional_frame(&self.samples, max_lag, lag_count)?
        };
        if self.overlay_fit.checked() {
            mapper::overlay_best_fit(&mut experimental, &vgram, max_lag)?;
        }
        frames.push(Frame::Plot(experimental));

        if self.show_kriging.checked() {
            let model = params.to_model();
            let ellipsoid = if self.directional.checked() {
                Ellipsoid::oriented(
                    range,
                    0.5 * range,
                    0.5 * range,
                    self.azimuth.value(),
                    self.dip.value(),
                )
            } else {
                Ellipsoid::sphere(range)
            };

            let maps = mapper::kriging_frames(
                &self.samples,
                &model,
                &self.estimation_grid(),
                &ellipsoid,
                &SearchParams::default(),
                self.show_variance.checked(),
            );
            frames.extend(maps.into_iter().map(Frame::Map));
        }

        self.frames = frames;
        self.dirty = false;
        Ok(())
    }

    fn estimation_grid(&self) -> GridSpec {
        let (min, max) = bounds(&self.samples);

        GridSpec {
            origin: Point3::new(min.x, min.y, min.z),
            nx: GRID_RES,
            ny: GRID_RES,
            dx: ((max.x - min.x) / (GRID_RES - 1) as f64).max(1e-9),
            dy: ((max.y - min.y) / (GRID_RES - 1) as f64).max(1e-9),
        }
    }
}

fn bounds(samples: &SampleSet) -> (Point3<f64>, Point3<f64>) {
    let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    for p in &samples.points {
        min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
        max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
    }
    if samples.points.is_empty() {
        (Point3::origin(), Point3::origin())
    } else {
        (min, max)
    }
}
