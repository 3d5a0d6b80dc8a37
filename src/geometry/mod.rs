use nalgebra::{UnitVector3, Vector3};

pub mod coordinate_system;
pub mod ellipsoid;

pub use coordinate_system::CoordinateSystem;
pub use ellipsoid::Ellipsoid;

/// Direction looked at under azimuth 0.
pub fn north() -> UnitVector3<f64> {
    UnitVector3::new_unchecked(Vector3::new(0.0, 1.0, 0.0))
}

/// Direction looked at under azimuth 90.
pub fn east() -> UnitVector3<f64> {
    UnitVector3::new_unchecked(Vector3::new(1.0, 0.0, 0.0))
}

pub fn up() -> UnitVector3<f64> {
    UnitVector3::new_unchecked(Vector3::new(0.0, 0.0, 1.0))
}

/// Convert an (azimuth, dip) pair in degrees to a unit direction vector.
///
/// Azimuth is measured clockwise from north within the horizontal plane,
/// dip positive below the horizontal. A direction and its opposite describe
/// the same separation: `sph2cart(az + 180, -dip) == -sph2cart(az, dip)`.
pub fn sph2cart(azimuth_deg: f64, dip_deg: f64) -> UnitVector3<f64> {
    let az = azimuth_deg.to_radians();
    let dip = dip_deg.to_radians();

    UnitVector3::new_normalize(Vector3::new(
        az.sin() * dip.cos(),
        az.cos() * dip.cos(),
        -dip.sin(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sph2cart_reference_directions() {
        assert_relative_eq!(sph2cart(0.0, 0.0).into_inner(), north().into_inner());
        assert_relative_eq!(
            sph2cart(90.0, 0.0).into_inner(),
            east().into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            sph2cart(0.0, -90.0).into_inner(),
            up().into_inner(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn sph2cart_opposite_sense() {
        for az in [0.0, 35.0, 90.0, 212.5] {
            for dip in [0.0, -45.0, 30.0] {
                let d = sph2cart(az, dip);
                let opposite = sph2cart(az + 180.0, -dip);
                assert_relative_eq!(
                    d.into_inner(),
                    -opposite.into_inner(),
                    epsilon = 1e-12
                );
            }
        }
    }
}
