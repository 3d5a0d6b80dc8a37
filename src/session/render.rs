//! Plot-ready data handed to whatever frontend draws the notebook. Axis
//! labels and trace styles are fixed here; drawing itself is out of scope.

use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    Line,
    Bars,
    Points,
}

#[derive(Debug, Clone)]
pub struct Trace {
    pub name: String,
    pub style: TraceStyle,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Trace {
    pub fn line(name: impl Into<String>, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            style: TraceStyle::Line,
            xs,
            ys,
        }
    }

    pub fn bars(name: impl Into<String>, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            style: TraceStyle::Bars,
            xs,
            ys,
        }
    }

    pub fn points(name: impl Into<String>, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            style: TraceStyle::Points,
            xs,
            ys,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotFrame {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub traces: Vec<Trace>,
}

impl PlotFrame {
    /// Frame with the fixed variogram axes.
    pub fn variogram(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "lag distance h",
            y_label: "semivariance γ(h)",
            traces: Vec::new(),
        }
    }
}

/// Gridded surface (kriging estimate or variance), row-major.
#[derive(Debug, Clone)]
pub struct MapFrame {
    pub title: String,
    pub origin: (f64, f64),
    pub dx: f64,
    pub dy: f64,
    pub cells: Array2<f64>,
}

#[derive(Debug, Clone)]
pub enum Frame {
    Plot(PlotFrame),
    Map(MapFrame),
}

impl Frame {
    pub fn title(&self) -> &str {
        match self {
            Frame::Plot(p) => &p.title,
            Frame::Map(m) => &m.title,
        }
    }
}
