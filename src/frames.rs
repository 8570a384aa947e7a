//! Axis conventions between the robot frame and the rig (world) frame.
//!
//! Robot frame: x forward, y left, z up. Rig frame: x right, y up, z forward.
//! `robot_to_world(p) = (-p.y, p.z, p.x)`. The map has determinant -1, so
//! quaternion vector parts pick up an extra sign flip when remapped.
//!
//! Every function here is a permutation with sign flips; no arithmetic
//! happens beyond negation, so round trips are exact.

use nalgebra::{Point2, Point3, Quaternion, UnitQuaternion, Vector3};

/// Full 3-axis remap, height preserved.
pub fn robot_to_world(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(-p.y, p.z, p.x)
}

pub fn world_to_robot(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(p.z, -p.x, p.y)
}

/// Drops robot height and lands the point on the rig ground plane (y = 0).
pub fn robot_to_world_ground_plane(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(-p.y, 0.0, p.x)
}

pub fn robot_to_world_vector(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.y, v.z, v.x)
}

pub fn world_to_robot_vector(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.z, -v.x, v.y)
}

pub fn robot_to_world_orientation(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let q = q.quaternion();
    UnitQuaternion::new_unchecked(Quaternion::new(q.w, q.j, -q.k, -q.i))
}

pub fn world_to_robot_orientation(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let q = q.quaternion();
    UnitQuaternion::new_unchecked(Quaternion::new(q.w, -q.k, q.i, -q.j))
}

// canvas plane: robot frame turned a quarter turn about its z axis

pub fn robot_to_canvas(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(p.y, -p.x, p.z)
}

pub fn robot_to_canvas_orientation(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let q = q.quaternion();
    UnitQuaternion::new_unchecked(Quaternion::new(q.w, q.j, -q.i, q.k))
}

pub fn robot_to_canvas_scale(s: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(s.y, s.x, s.z)
}

/// Position on the 2D canvas for a rig-frame point on (or above) the ground plane.
pub fn world_to_canvas_plane(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x, p.z)
}
