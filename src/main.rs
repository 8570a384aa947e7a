use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use nalgebra::{Point3, Quaternion, UnitQuaternion};

use projection_overlay::anchors::Placement;
use projection_overlay::{
    CalibrationParameters, CalibrationStore, CanvasOrigin, LiveIntrinsics, OverlayConfig,
    ProjectionMapper, RigPose, RigPoseTracker,
};

#[derive(Parser)]
#[command(name = "projection-overlay")]
#[command(about = "Inspect projector calibration and project robot-frame points")]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calibration XML (overrides the config file)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// JSON file with live colour intrinsics to merge after loading
    #[arg(long)]
    live_intrinsics: Option<PathBuf>,

    #[arg(long, value_enum)]
    origin: Option<OriginArg>,

    /// Keep the rig Y axis as is instead of flipping it into image rows
    #[arg(long)]
    no_flip_y: bool,

    /// Apply projector lens distortion
    #[arg(long)]
    lens_distortion: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed calibration
    Show,

    /// Print the projector pose for a sensor pose given in the robot frame
    Pose {
        #[command(flatten)]
        sensor: SensorArgs,
    },

    /// Project a robot-frame point to a projector pixel
    Project {
        /// Point in the robot frame, metres
        #[arg(num_args = 3, allow_negative_numbers = true, value_names = ["X", "Y", "Z"])]
        point: Vec<f64>,

        /// Drop the height and project onto the ground plane
        #[arg(long)]
        ground: bool,

        #[command(flatten)]
        sensor: SensorArgs,
    },
}

#[derive(clap::Args)]
struct SensorArgs {
    /// Sensor position in the robot frame, metres
    #[arg(long, num_args = 3, allow_negative_numbers = true, value_names = ["X", "Y", "Z"])]
    sensor_position: Option<Vec<f64>>,

    /// Sensor orientation in the robot frame as a quaternion
    #[arg(long, num_args = 4, allow_negative_numbers = true, value_names = ["X", "Y", "Z", "W"])]
    sensor_orientation: Option<Vec<f64>>,
}

impl SensorArgs {
    fn pose(&self) -> RigPose {
        let position = match &self.sensor_position {
            Some(p) => Point3::new(p[0], p[1], p[2]),
            None => Point3::origin(),
        };
        let orientation = match &self.sensor_orientation {
            Some(q) => UnitQuaternion::from_quaternion(Quaternion::new(q[3], q[0], q[1], q[2])),
            None => UnitQuaternion::identity(),
        };
        RigPose::from_robot(&position, &orientation)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OriginArg {
    Corner,
    Centered,
}

impl From<OriginArg> for CanvasOrigin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Corner => CanvasOrigin::Corner,
            OriginArg::Centered => CanvasOrigin::Centered,
        }
    }
}

fn load_config(cli: &Cli) -> Result<OverlayConfig> {
    let mut config = match &cli.config {
        Some(path) => OverlayConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OverlayConfig::default(),
    };
    if let Some(path) = &cli.calibration {
        config.calibration_path = path.clone();
    }
    if let Some(origin) = cli.origin {
        config.projection.origin = origin.into();
    }
    if cli.no_flip_y {
        config.projection.flip_y = false;
    }
    if cli.lens_distortion {
        config.projection.lens_distortion = true;
    }
    Ok(config)
}

fn print_calibration(calib: &CalibrationParameters) {
    let k = calib.projector.intrinsics();
    println!("image        {} x {}", calib.image_size.width, calib.image_size.height);
    println!("projector    fx={} fy={} cx={} cy={}", k.fx, k.fy, k.cx, k.cy);
    println!("distortion   {:?}", calib.projector.distortion.to_array());
    match &calib.camera {
        Some(camera) => {
            let c = camera.intrinsics();
            println!(
                "camera       fx={} fy={} cx={} cy={}{}",
                c.fx,
                c.fy,
                c.cx,
                c.cy,
                if calib.live_intrinsics { " (live)" } else { "" }
            );
        }
        None => println!("camera       -"),
    }
    println!("extrinsic (m){:.6}", calib.extrinsic());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    debug!("{:?}", config);

    let store = CalibrationStore::load(&config.calibration_path).with_context(|| {
        format!("loading calibration {}", config.calibration_path.display())
    })?;
    if let Some(path) = &cli.live_intrinsics {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let live: LiveIntrinsics = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        store.update(&live)?;
    }
    let calib = store.snapshot();

    match &cli.command {
        Commands::Show => print_calibration(&calib),
        Commands::Pose { sensor } => {
            let mut tracker = RigPoseTracker::new(ProjectionMapper::new(config.projection), &calib);
            let projector = tracker.update_projector_pose(sensor.pose(), &calib);
            println!("position     {:?}", projector.position);
            println!("orientation  {:?}", projector.orientation);
        }
        Commands::Project {
            point,
            ground,
            sensor,
        } => {
            let placement = if *ground {
                Placement::GroundPlane
            } else {
                Placement::Full
            };
            let mut tracker = RigPoseTracker::new(ProjectionMapper::new(config.projection), &calib);
            tracker.update_projector_pose(sensor.pose(), &calib);
            let robot = Point3::new(point[0], point[1], point[2]);
            let screen = tracker.anchor_robot_point("cli", &robot, placement, &calib);
            match screen.defined() {
                Some(pixel) => {
                    if !screen.in_image(calib.image_size) {
                        warn!("point falls outside the projector image");
                    }
                    println!("{} {} depth={}", pixel.x, pixel.y, screen.depth);
                }
                None => println!("undefined (point on the projector focal plane)"),
            }
        }
    }

    Ok(())
}
