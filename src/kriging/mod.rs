use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use indicatif::ParallelProgressIterator;
use nalgebra::{DMatrix, DVector, Point3};
use ndarray::Array2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::geometry::Ellipsoid;
use crate::samples::SampleSet;
use crate::variography::models::NestedModel;

// squared distance below which the target is the sample itself
const EXACT_HIT_DIST_SQ: f64 = 1e-18;

#[derive(Debug, Clone)]
pub enum KrigingError {
    NotEnoughNeighbors { found: usize, required: usize },
    SingularSystem,
}

impl Display for KrigingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KrigingError::NotEnoughNeighbors { found, required } => {
                write!(
                    f,
                    "Found {} neighbors in search ellipsoid, need {}",
                    found, required
                )
            }
            KrigingError::SingularSystem => write!(f, "Singular kriging system"),
        }
    }
}

impl std::error::Error for KrigingError {}

/// Neighbor count bounds for the search neighborhood.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub min_neighbors: usize,
    pub max_neighbors: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_neighbors: 2,
            max_neighbors: 16,
        }
    }
}

/// Ordinary kriging output at one location.
#[derive(Debug, Clone, Copy)]
pub struct KrigingEstimate {
    pub value: f64,
    pub variance: f64,
    pub neighbors: usize,
}

/// Ordinary kriging estimate at `location`.
///
/// Neighbors come from the search ellipsoid translated to the target, nearest
/// first, capped at `max_neighbors`. The (k+1)-system with the Lagrange row
/// enforces unit weight sum; the returned variance is the kriging variance,
/// clamped at zero.
pub fn ordinary_kriging_at(
    samples: &SampleSet,
    model: &NestedModel,
    location: Point3<f64>,
    search_ellipsoid: &Ellipsoid,
    params: &SearchParams,
) -> Result<KrigingEstimate, KrigingError> {
    let required = params.min_neighbors.max(1);

    let mut ellipsoid = search_ellipsoid.clone();
    ellipsoid.translate_to(location);

    let max_reach_sq = ellipsoid.max_axis() * ellipsoid.max_axis();
    let mut neighbors: Vec<usize> = Vec::with_capacity(params.max_neighbors);

    for (entry, dist_sq) in samples
        .tree
        .nearest_neighbor_iter_with_distance_2(&[location.x, location.y, location.z])
    {
        // past the longest semi-axis nothing can be inside the ellipsoid
        if dist_sq > max_reach_sq {
            break;
        }

        let ind = entry.data as usize;
        if dist_sq < EXACT_HIT_DIST_SQ {
            return Ok(KrigingEstimate {
                value: samples.values[ind],
                variance: 0.0,
                neighbors: 1,
            });
        }

        let geom = entry.geom();
        if !ellipsoid.contains(&Point3::new(geom[0], geom[1], geom[2])) {
            continue;
        }

        neighbors.push(ind);
        if neighbors.len() == params.max_neighbors {
            break;
        }
    }

    let k = neighbors.len();
    if k < required {
        return Err(KrigingError::NotEnoughNeighbors { found: k, required });
    }

    // (k+1) x (k+1) gamma system with Lagrange row/column
    let m = k + 1;
    let mut mat = DMatrix::<f64>::zeros(m, m);
    let mut rhs = DVector::<f64>::zeros(m);

    for (i, &a) in neighbors.iter().enumerate() {
        let pa = samples.points[a];
        for (j, &b) in neighbors.iter().enumerate().take(i) {
            let gamma = model.variogram((pa - samples.points[b]).norm());
            mat[(i, j)] = gamma;
            mat[(j, i)] = gamma;
        }
        mat[(i, k)] = 1.0;
        mat[(k, i)] = 1.0;
        rhs[i] = model.variogram((pa - location).norm());
    }
    rhs[k] = 1.0;

    let weights = mat.lu().solve(&rhs).ok_or(KrigingError::SingularSystem)?;

    let mut value = 0.0;
    let mut variance = weights[k];
    for (i, &ind) in neighbors.iter().enumerate() {
        value += weights[i] * samples.values[ind];
        variance += weights[i] * rhs[i];
    }

    Ok(KrigingEstimate {
        value,
        variance: variance.max(0.0),
        neighbors: k,
    })
}

/// Planar estimation grid, row-major (ny rows by nx columns).
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    pub origin: Point3<f64>,
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dy: f64,
}

impl GridSpec {
    pub fn node(&self, i: usize, j: usize) -> Point3<f64> {
        Point3::new(
            self.origin.x + i as f64 * self.dx,
            self.origin.y + j as f64 * self.dy,
            self.origin.z,
        )
    }
}

/// Kriged surface: estimates and kriging variances, NaN where estimation failed.
#[derive(Debug, Clone)]
pub struct KrigingGrid {
    pub estimate: Array2<f64>,
    pub variance: Array2<f64>,
}

/// Ordinary kriging over a whole grid, rows in parallel with a progress bar.
pub fn ordinary_kriging_grid(
    samples: &SampleSet,
    model: &NestedModel,
    grid: &GridSpec,
    search_ellipsoid: &Ellipsoid,
    params: &SearchParams,
) -> KrigingGrid {
    let rows = (0..grid.ny)
        .into_par_iter()
        .progress_count(grid.ny as u64)
        .map(|j| {
            let mut row = Vec::with_capacity(grid.nx);
            for i in 0..grid.nx {
                let node = grid.node(i, j);
                match ordinary_kriging_at(samples, model, node, search_ellipsoid, params) {
                    Ok(est) => row.push((est.value, est.variance)),
                    Err(_) => row.push((f64::NAN, f64::NAN)),
                }
            }
            row
        })
        .collect::<Vec<_>>();

    let mut estimate = Array2::from_elem((grid.ny, grid.nx), f64::NAN);
    let mut variance = Array2::from_elem((grid.ny, grid.nx), f64::NAN);
    for (j, row) in rows.into_iter().enumerate() {
        for (i, (e, v)) in row.into_iter().enumerate() {
            estimate[(j, i)] = e;
            variance[(j, i)] = v;
        }
    }

    KrigingGrid { estimate, variance }
}
