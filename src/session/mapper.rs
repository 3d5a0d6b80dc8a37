//! Parameter-to-model mapping: widget-derived parameter objects go in, the
//! geostatistics calls run, and plot frames with fixed styling come out.

use crate::geometry::Ellipsoid;
use crate::kriging::{ordinary_kriging_grid, GridSpec, SearchParams};
use crate::samples::SampleSet;
use crate::variography::experimental::{
    directional_variogram, empirical_variogram, DirectionalQuery, EmpiricalVariogram,
};
use crate::variography::fitting::{fit_best, FitError};
use crate::variography::models::{NestedModel, VariogramParameters};
use crate::variography::ParameterError;

use super::render::{MapFrame, PlotFrame, Trace};

// fixed sampling density of model curves
const CURVE_SAMPLES: usize = 200;

/// Sample a model curve over `[0, max_h]`.
pub fn model_curve(model: &NestedModel, name: &str, max_h: f64) -> Trace {
    let mut xs = Vec::with_capacity(CURVE_SAMPLES + 1);
    let mut ys = Vec::with_capacity(CURVE_SAMPLES + 1);
    for i in 0..=CURVE_SAMPLES {
        let h = max_h * i as f64 / CURVE_SAMPLES as f64;
        xs.push(h);
        ys.push(model.variogram(h));
    }
    Trace::line(name, xs, ys)
}

/// Frame for a single theoretical model chosen by the model-kind select.
pub fn theoretical_frame(params: &VariogramParameters, max_h: f64) -> PlotFrame {
    let model = params.to_model();
    let mut frame = PlotFrame::variogram(format!("{} model", params.kind.label()));
    frame
        .traces
        .push(model_curve(&model, params.kind.label(), max_h));
    frame
}

/// Frame for a nested model: one curve per structure plus the total.
pub fn nested_frame(model: &NestedModel, max_h: f64) -> PlotFrame {
    let mut frame = PlotFrame::variogram("nested model");

    for (i, structure) in model.structures.iter().enumerate() {
        let single = NestedModel {
            nugget: 0.0,
            structures: vec![*structure],
        };
        let name = format!("{} {}", structure.kind.label(), i + 1);
        frame.traces.push(model_curve(&single, &name, max_h));
    }
    frame.traces.push(model_curve(model, "total", max_h));
    frame
}

fn empirical_trace(vgram: &EmpiricalVariogram) -> Trace {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (lag, (sv, cnt)) in vgram
        .lags
        .iter()
        .zip(vgram.semivariance.iter().zip(vgram.counts.iter()))
    {
        if *cnt == 0 {
            continue;
        }
        xs.push(lag.center());
        ys.push(*sv);
    }
    Trace::bars("γ̂", xs, ys)
}

/// Omnidirectional experimental variogram frame, with the sample variance as
/// a sill reference line.
pub fn omnidirectional_frame(
    samples: &SampleSet,
    max_lag: f64,
    lag_count: usize,
) -> Result<(PlotFrame, EmpiricalVariogram), ParameterError> {
    let vgram = empirical_variogram(samples, max_lag, lag_count)?;

    let mut frame = PlotFrame::variogram("experimental variogram");
    frame.traces.push(empirical_trace(&vgram));
    frame.traces.push(variance_reference(samples, max_lag));

    Ok((frame, vgram))
}

/// Directional experimental variogram frame for one query.
pub fn directional_frame(
    samples: &SampleSet,
    query: &DirectionalQuery,
) -> Result<(PlotFrame, EmpiricalVariogram), ParameterError> {
    let vgram = directional_variogram(samples, query)?;

    let mut frame = PlotFrame::variogram(format!(
        "experimental variogram, azimuth {:.0} dip {:.0}",
        query.azimuth, query.dip
    ));
    frame.traces.push(empirical_trace(&vgram));
    frame.traces.push(variance_reference(samples, query.max_lag));

    Ok((frame, vgram))
}

fn variance_reference(samples: &SampleSet, max_lag: f64) -> Trace {
    let var = samples.variance();
    Trace::line("sample variance", vec![0.0, max_lag], vec![var, var])
}

/// Overlay the best-fitting model curve on an experimental frame.
pub fn overlay_best_fit(
    frame: &mut PlotFrame,
    vgram: &EmpiricalVariogram,
    max_h: f64,
) -> Result<(), FitError> {
    let fitted = fit_best(vgram)?;
    let name = format!("fit: {}", fitted.params.kind.label());
    frame
        .traces
        .push(model_curve(&fitted.params.to_model(), &name, max_h));
    Ok(())
}

/// Kriged estimate map, and the variance map when requested.
pub fn kriging_frames(
    samples: &SampleSet,
    model: &NestedModel,
    grid: &GridSpec,
    search_ellipsoid: &Ellipsoid,
    params: &SearchParams,
    include_variance: bool,
) -> Vec<MapFrame> {
    let kriged = ordinary_kriging_grid(samples, model, grid, search_ellipsoid, params);

    let mut frames = vec![MapFrame {
        title: "kriged estimate".into(),
        origin: (grid.origin.x, grid.origin.y),
        dx: grid.dx,
        dy: grid.dy,
        cells: kriged.estimate,
    }];

    if include_variance {
        frames.push(MapFrame {
            title: "kriging variance".into(),
            origin: (grid.origin.x, grid.origin.y),
            dx: grid.dx,
            dy: grid.dy,
            cells: kriged.variance,
        });
    }

    frames
}
