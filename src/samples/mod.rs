use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rstar::primitives::GeomWithData;
use rstar::RTree;

type TreePoint = GeomWithData<[f64; 3], u32>;

#[derive(Debug)]
pub enum LoadError {
    Csv(csv::Error),
    MissingColumn(String),
    BadValue { column: String, raw: String },
    Empty,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Csv(e) => write!(f, "csv error: {}", e),
            LoadError::MissingColumn(col) => write!(f, "missing column: {}", col),
            LoadError::BadValue { column, raw } => {
                write!(f, "bad value in column {}: {:?}", column, raw)
            }
            LoadError::Empty => write!(f, "no samples in file"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Csv(e)
    }
}

/// Which CSV columns hold coordinates and the measured attribute.
///
/// 2D datasets leave `z` as `None` and load with z = 0.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub x: String,
    pub y: String,
    pub z: Option<String>,
    pub value: String,
}

impl ColumnSpec {
    pub fn planar(x: &str, y: &str, value: &str) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: None,
            value: value.into(),
        }
    }

    pub fn spatial(x: &str, y: &str, z: &str, value: &str) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: Some(z.into()),
            value: value.into(),
        }
    }
}

/// Immutable point samples, loaded once per session.
#[derive(Clone, Debug)]
pub struct SampleSet {
    pub tree: RTree<TreePoint>,
    pub points: Vec<Point3<f64>>,
    pub values: Vec<f64>,
}

impl SampleSet {
    pub fn new(points: Vec<Point3<f64>>, values: Vec<f64>) -> Self {
        debug_assert_eq!(points.len(), values.len());
        let tree_points = points
            .iter()
            .enumerate()
            .map(|(i, p)| TreePoint::new([p.x, p.y, p.z], i as u32))
            .collect();
        let tree = RTree::bulk_load(tree_points);

        Self {
            tree,
            points,
            values,
        }
    }

    /// Read samples from a CSV file with named columns.
    pub fn from_csv<P: AsRef<Path>>(path: P, columns: &ColumnSpec) -> Result<Self, LoadError> {
        let mut points = Vec::new();
        let mut values = Vec::new();

        let mut rdr = csv::Reader::from_path(path)?;
        for result in rdr.deserialize() {
            let record: HashMap<String, String> = result?;

            let x = parse_field(&record, &columns.x)?;
            let y = parse_field(&record, &columns.y)?;
            let z = match &columns.z {
                Some(col) => parse_field(&record, col)?,
                None => 0.0,
            };
            let value = parse_field(&record, &columns.value)?;

            points.push(Point3::new(x, y, z));
            values.push(value);
        }

        if points.is_empty() {
            return Err(LoadError::Empty);
        }

        Ok(Self::new(points, values))
    }

    /// Synthetic nx-by-ny planar grid with unit-normal attribute values drawn
    /// from a seeded generator. Identical seeds produce identical sample sets.
    pub fn regular_grid(nx: usize, ny: usize, spacing: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        // unwrap: unit std deviation is always a valid Normal
        let normal = Normal::new(0.0, 1.0).unwrap();

        let mut points = Vec::with_capacity(nx * ny);
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                points.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
                values.push(normal.sample(&mut rng));
            }
        }

        Self::new(points, values)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the attribute values.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Attribute variance, the natural sill reference for a variogram plot.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let mean = self.mean();
        self.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / self.values.len() as f64
    }
}

fn parse_field(record: &HashMap<String, String>, column: &str) -> Result<f64, LoadError> {
    let raw = record
        .get(column)
        .ok_or_else(|| LoadError::MissingColumn(column.to_string()))?;
    raw.trim().parse::<f64>().map_err(|_| LoadError::BadValue {
        column: column.to_string(),
        raw: raw.clone(),
    })
}
