use nalgebra::Point3;

use crate::geometry::coordinate_system::CoordinateSystem;

/// Search neighborhood for kriging estimation.
#[derive(Clone, Debug)]
pub struct Ellipsoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub coordinate_system: CoordinateSystem,
}

impl Ellipsoid {
    /// Create a new Ellipsoid with given major (a), semi-major (b), and minor axis (c)
    ///  coordinate system defines location and orientation of ellipsoid
    ///      - location is defined by the translation component of the coordinate system
    ///      - orientation is defined by the rotation component of the coordinate system
    ///
    /// The major axis runs along the local y (forward) axis.
    pub fn new(a: f64, b: f64, c: f64, coordinate_system: CoordinateSystem) -> Self {
        Self {
            a,
            b,
            c,
            coordinate_system,
        }
    }

    /// Isotropic search sphere of radius `r` centered at the origin.
    pub fn sphere(r: f64) -> Self {
        Self::new(r, r, r, CoordinateSystem::default())
    }

    /// Oriented ellipsoid whose major axis points along (azimuth, dip) degrees.
    pub fn oriented(a: f64, b: f64, c: f64, azimuth_deg: f64, dip_deg: f64) -> Self {
        Self::new(
            a,
            b,
            c,
            CoordinateSystem::from_azimuth_dip(Point3::origin(), azimuth_deg, dip_deg),
        )
    }

    /// Longest semi-axis, bounds the distance of any contained point to the center.
    pub fn max_axis(&self) -> f64 {
        self.a.max(self.b).max(self.c)
    }

    pub fn normalized_local_distance_sq(&self, point: &Point3<f64>) -> f64 {
        let u = point.y / self.a;
        let v = point.x / self.b;
        let w = point.z / self.c;

        u * u + v * v + w * w
    }

    /// Checks if ellipsoid contains a point (world coordinates)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let point = self.coordinate_system.global_to_local(point);

        self.normalized_local_distance_sq(&point) <= 1.0
    }

    /// Move the ellipsoid center to a new world location, keeping orientation.
    pub fn translate_to(&mut self, center: Point3<f64>) {
        self.coordinate_system.set_origin(center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_contains() {
        let mut e = Ellipsoid::sphere(2.0);
        e.translate_to(Point3::new(10.0, 0.0, 0.0));

        assert!(e.contains(&Point3::new(11.9, 0.0, 0.0)));
        assert!(e.contains(&Point3::new(10.0, -1.9, 0.0)));
        assert!(!e.contains(&Point3::new(12.1, 0.0, 0.0)));
    }

    #[test]
    fn oriented_ellipsoid_contains_along_major_axis() {
        // major axis along east, minor axes tight
        let e = Ellipsoid::oriented(10.0, 1.0, 1.0, 90.0, 0.0);

        assert!(e.contains(&Point3::new(9.5, 0.0, 0.0)));
        assert!(!e.contains(&Point3::new(0.0, 9.5, 0.0)));
        assert!(!e.contains(&Point3::new(0.0, 0.0, 2.0)));
    }
}
