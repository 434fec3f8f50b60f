//! Frustum culling for chunk visibility.
//!
//! Extracts the six clip planes from a view-projection matrix and tests
//! axis-aligned boxes against them.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

/// A plane `n·p + d = 0` with a unit normal pointing into the frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal, pointing inside
    pub normal: Vector3<f32>,
    /// Signed offset from the origin
    pub d: f32,
}

impl Plane {
    /// Builds a plane from raw `(a, b, c, d)` coefficients and normalizes it.
    fn from_coefficients(v: Vector4<f32>) -> Self {
        let normal = Vector3::new(v.x, v.y, v.z);
        let len = normal.magnitude();
        if len > 0.0 {
            Plane {
                normal: normal / len,
                d: v.w / len,
            }
        } else {
            Plane { normal, d: v.w }
        }
    }

    /// Signed distance from `point` to the plane. Positive is inside.
    pub fn distance_to_point(&self, point: Point3<f32>) -> f32 {
        self.normal.x * point.x + self.normal.y * point.y + self.normal.z * point.z + self.d
    }
}

/// View frustum for culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts frustum planes from a view-projection matrix.
    ///
    /// The matrix must map depth into `[0, 1]`, as [`super::camera::Projection`] does.
    pub fn from_view_projection(m: &Matrix4<f32>) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        Frustum {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Whether the box `[min, max]` is at least partly inside the frustum.
    ///
    /// Conservative: boxes near a frustum corner may be reported as visible.
    pub fn intersects_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            // The box corner furthest along the plane normal.
            let positive = Point3::new(
                if plane.normal.x >= 0.0 { max.x } else { min.x },
                if plane.normal.y >= 0.0 { max.y } else { min.y },
                if plane.normal.z >= 0.0 { max.z } else { min.z },
            );
            plane.distance_to_point(positive) >= 0.0
        })
    }

    /// Whether `point` is inside the frustum.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}
