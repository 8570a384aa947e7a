use std::collections::hash_map::Entry;
use std::collections::HashMap;

use nalgebra::Point3;

use crate::calibration::CalibrationParameters;
use crate::frames;
use crate::projection::{ProjectionMapper, ScreenPoint};
use crate::rig::RigPose;

/// How a robot-frame point is brought into the rig frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Projected onto the ground plane, height dropped. For flat canvas overlays.
    GroundPlane,
    /// Height kept. For overlays in the tracked volume.
    Full,
}

impl Placement {
    pub fn robot_to_world(&self, p: &Point3<f64>) -> Point3<f64> {
        match self {
            Placement::GroundPlane => frames::robot_to_world_ground_plane(p),
            Placement::Full => frames::robot_to_world(p),
        }
    }
}

/// An entity registered against the projector frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredPoint {
    pub id: String,
    pub world: Point3<f64>,
    pub screen: ScreenPoint,
}

impl AnchoredPoint {
    pub fn new(id: impl Into<String>, world: &Point3<f64>) -> AnchoredPoint {
        AnchoredPoint {
            id: id.into(),
            world: *world,
            screen: ScreenPoint::undefined(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AnchorMap {
    anchors: HashMap<String, AnchoredPoint>, // id -> anchored point
}

impl AnchorMap {
    pub fn new() -> AnchorMap {
        AnchorMap {
            anchors: HashMap::new(),
        }
    }

    /// Inserts or replaces `id`; the cached screen point is left undefined
    /// until the next projection.
    pub fn insert(&mut self, id: impl Into<String>, world: &Point3<f64>) -> &mut AnchoredPoint {
        let id = id.into();
        let anchor = AnchoredPoint::new(id.clone(), world);
        match self.anchors.entry(id) {
            Entry::Occupied(mut e) => {
                e.insert(anchor);
                e.into_mut()
            }
            Entry::Vacant(e) => e.insert(anchor),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AnchoredPoint> {
        self.anchors.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<AnchoredPoint> {
        self.anchors.remove(id)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnchoredPoint> {
        self.anchors.values()
    }

    /// Recomputes every cached screen point from its stored world point.
    pub fn reproject_all(
        &mut self,
        mapper: &ProjectionMapper,
        calib: &CalibrationParameters,
        projector: &RigPose,
    ) -> usize {
        for anchor in self.anchors.values_mut() {
            anchor.screen = mapper.project(&anchor.world, calib, projector);
        }
        self.anchors.len()
    }
}
