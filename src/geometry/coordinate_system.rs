use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};

/// Local coordinate frame of an oriented geometry.
///
/// Local +y is the frame's forward axis; orienting by azimuth/dip aligns it
/// with [`crate::geometry::sph2cart`] of the same angles.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CoordinateSystem {
    pub translation: Translation3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub world_to_local: Isometry3<f64>,
    pub local_to_world: Isometry3<f64>,
}

impl CoordinateSystem {
    /// Creates a new coordinate system from a translation and a rotation quaternion
    /// # Arguments
    /// * `translation` - translation component of the coordinate system (origin of coordinate system)
    /// * `quat` - rotation component of the coordinate system
    pub fn new(translation: Translation3<f64>, quat: UnitQuaternion<f64>) -> Self {
        let local_to_world = Isometry3::from_parts(translation, quat);
        let world_to_local = local_to_world.inverse();
        Self {
            translation,
            rotation: quat,
            world_to_local,
            local_to_world,
        }
    }

    /// Create a coordinate system at `origin` whose forward axis points along
    /// the (azimuth, dip) direction, both in degrees.
    pub fn from_azimuth_dip(origin: Point3<f64>, azimuth_deg: f64, dip_deg: f64) -> Self {
        let az = azimuth_deg.to_radians();
        let dip = dip_deg.to_radians();

        //yaw about z swings the forward axis clockwise from north,
        //roll about x tilts it below the horizontal
        let quat = UnitQuaternion::from_euler_angles(-dip, 0.0, -az);
        let trans = Translation3::new(origin.x, origin.y, origin.z);
        Self::new(trans, quat)
    }

    /// Set the origin of the coordinate system
    pub fn set_origin(&mut self, origin: Point3<f64>) {
        self.translation = Translation3::new(origin.x, origin.y, origin.z);
        self.local_to_world = Isometry3::from_parts(self.translation, self.rotation);
        self.world_to_local = self.local_to_world.inverse();
    }

    /// Origin of the coordinate system
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.translation.x, self.translation.y, self.translation.z)
    }

    /// Convert a point from global to local coordinates
    pub fn global_to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        self.world_to_local.transform_point(point)
    }

    /// Convert a point from local to global coordinates
    pub fn local_to_global(&self, point: &Point3<f64>) -> Point3<f64> {
        self.local_to_world.transform_point(point)
    }
}
