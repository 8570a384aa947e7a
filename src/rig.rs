use log::debug;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use crate::anchors::{AnchorMap, Placement};
use crate::calibration::CalibrationParameters;
use crate::frames;
use crate::projection::{ProjectionMapper, ScreenPoint};

/// Pose of a tracked device in the rig (world) frame, metres.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RigPose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl RigPose {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> RigPose {
        RigPose {
            position,
            orientation,
        }
    }

    pub fn identity() -> RigPose {
        RigPose::new(Point3::origin(), UnitQuaternion::identity())
    }

    /// Pose reported in the robot frame, e.g. by the scene server.
    pub fn from_robot(position: &Point3<f64>, orientation: &UnitQuaternion<f64>) -> RigPose {
        RigPose::new(
            frames::robot_to_world(position),
            frames::robot_to_world_orientation(orientation),
        )
    }

    /// Local-to-world transform.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
    }

    pub fn world_to_local(&self, p: &Point3<f64>) -> Point3<f64> {
        self.isometry().inverse_transform_point(p)
    }

    pub fn local_to_world(&self, p: &Point3<f64>) -> Point3<f64> {
        self.isometry().transform_point(p)
    }
}

impl Default for RigPose {
    fn default() -> Self {
        RigPose::identity()
    }
}

/// Orientation whose local z axis points along `forward` and y axis towards `up`.
pub fn look_rotation(forward: &Vector3<f64>, up: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::face_towards(forward, up)
}

/// Projector pose derived from the sensor pose and the calibrated extrinsics.
///
/// The translation is expressed in the sensor frame, so it is rotated by the
/// sensor orientation before being added to the sensor position.
pub fn update_projector_pose(sensor: &RigPose, calib: &CalibrationParameters) -> RigPose {
    let inverse = calib.rotation_inverse();
    let forward: Vector3<f64> = inverse.column(2).into_owned();
    let up: Vector3<f64> = inverse.column(1).into_owned();
    let position = sensor.position + sensor.orientation * calib.translation_m();
    let orientation = sensor.orientation * look_rotation(&forward, &up);
    RigPose::new(position, orientation)
}

type PoseListener = Box<dyn FnMut(&RigPose, &AnchorMap) + Send>;

/// Keeps the projector pose in step with the depth sensor and the screen
/// points of everything anchored to the projector.
pub struct RigPoseTracker {
    mapper: ProjectionMapper,
    sensor: RigPose,
    projector: RigPose,
    anchors: AnchorMap,
    listeners: Vec<PoseListener>,
}

impl RigPoseTracker {
    pub fn new(mapper: ProjectionMapper, calib: &CalibrationParameters) -> RigPoseTracker {
        let sensor = RigPose::identity();
        RigPoseTracker {
            mapper,
            sensor,
            projector: update_projector_pose(&sensor, calib),
            anchors: AnchorMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn sensor_pose(&self) -> &RigPose {
        &self.sensor
    }

    pub fn projector_pose(&self) -> &RigPose {
        &self.projector
    }

    pub fn mapper(&self) -> &ProjectionMapper {
        &self.mapper
    }

    pub fn anchors(&self) -> &AnchorMap {
        &self.anchors
    }

    /// Called on every projector pose change, after all anchors were reprojected.
    pub fn subscribe(&mut self, listener: impl FnMut(&RigPose, &AnchorMap) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Moves the sensor, rederives the projector and reprojects every anchor.
    pub fn update_projector_pose(
        &mut self,
        sensor: RigPose,
        calib: &CalibrationParameters,
    ) -> RigPose {
        self.sensor = sensor;
        self.refresh(calib)
    }

    /// Same sensor pose, new calibration (reload or live update).
    pub fn recalibrate(&mut self, calib: &CalibrationParameters) -> RigPose {
        self.refresh(calib)
    }

    pub fn anchor(
        &mut self,
        id: impl Into<String>,
        world: &Point3<f64>,
        calib: &CalibrationParameters,
    ) -> ScreenPoint {
        let screen = self.mapper.project(world, calib, &self.projector);
        self.anchors.insert(id, world).screen = screen;
        screen
    }

    pub fn anchor_robot_point(
        &mut self,
        id: impl Into<String>,
        robot: &Point3<f64>,
        placement: Placement,
        calib: &CalibrationParameters,
    ) -> ScreenPoint {
        let world = placement.robot_to_world(robot);
        self.anchor(id, &world, calib)
    }

    pub fn remove_anchor(&mut self, id: &str) -> bool {
        self.anchors.remove(id).is_some()
    }

    pub fn screen_point(&self, id: &str) -> Option<ScreenPoint> {
        self.anchors.get(id).map(|a| a.screen)
    }

    fn refresh(&mut self, calib: &CalibrationParameters) -> RigPose {
        self.projector = update_projector_pose(&self.sensor, calib);
        let n = self
            .anchors
            .reproject_all(&self.mapper, calib, &self.projector);
        debug!(
            "projector at {:?}, {} anchors reprojected",
            self.projector.position, n
        );
        for listener in self.listeners.iter_mut() {
            listener(&self.projector, &self.anchors);
        }
        self.projector
    }
}
