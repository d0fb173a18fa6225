//! Bodies of the system and their per-update transforms.
//!
//! Every update spins orbiting bodies about their Y axis, carries moons
//! along with their parent, and flies the ship from the steering input.
//! Bodies are updated in declaration order, so a parent is always current
//! before its children read its position.

use std::fmt;
use std::path::Path;

use log::{debug, error, info};
use nalgebra::{Matrix4, Vector3};

use crate::buffer::ModelBuffer;
use crate::config::{SceneConfig, ShipConfig};
use crate::input::SteerInput;
use crate::transform::Transform;
use crate::tri::{load_tri, TriError};
use crate::vecmath::{describe_mat4, forward, has_nan, position};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    UnknownBody { name: String },
    /// The parent is declared after the child.
    ParentOrder { body: String, parent: String },
    DuplicateBody { name: String },
    MultipleShips { first: String, second: String },
    ShipWithParent { name: String },
    DegenerateModel { name: String },
    RadiusCount { expected: usize, found: usize },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownBody { name } => write!(f, "no body named {name:?}"),
            SceneError::ParentOrder { body, parent } => {
                write!(f, "{body:?} must be declared after its parent {parent:?}")
            }
            SceneError::DuplicateBody { name } => write!(f, "body {name:?} is declared twice"),
            SceneError::MultipleShips { first, second } => {
                write!(f, "only one ship is supported, found {first:?} and {second:?}")
            }
            SceneError::ShipWithParent { name } => write!(f, "ship {name:?} cannot orbit a parent"),
            SceneError::DegenerateModel { name } => {
                write!(f, "model of {name:?} has no usable bounding radius")
            }
            SceneError::RadiusCount { expected, found } => {
                write!(f, "expected {expected} bounding radii, found {found}")
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Failure to bring up a scene from its config
#[derive(Debug)]
pub enum LoadError {
    Model { body: String, source: TriError },
    Scene(SceneError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Model { body, source } => write!(f, "loading model of {body:?}: {source}"),
            LoadError::Scene(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Model { source, .. } => Some(source),
            LoadError::Scene(e) => Some(e),
        }
    }
}

impl From<SceneError> for LoadError {
    fn from(e: SceneError) -> Self {
        LoadError::Scene(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Spin about Y by `radians` per update. Without a parent the spin
    /// carries the body around the origin; with one, around the parent.
    Orbit { radians: f32, parent: Option<usize> },
    /// Steered by keyboard input.
    Ship,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub motion: Motion,
    pub scale: f32,
    /// Position for top-level bodies and the ship, offset from the parent for moons.
    pub translate: Vector3<f32>,
    pub rotation: Matrix4<f32>,
    pub orientation: Matrix4<f32>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    bodies: Vec<Body>,
    ship: Option<usize>,
    ship_config: ShipConfig,
}

impl Scene {
    /// Build the scene from its config and the bounding radius of each body's model.
    pub fn build(config: &SceneConfig, radii: &[f32]) -> Result<Self, SceneError> {
        if radii.len() != config.bodies.len() {
            return Err(SceneError::RadiusCount {
                expected: config.bodies.len(),
                found: radii.len(),
            });
        }

        let mut bodies: Vec<Body> = Vec::with_capacity(config.bodies.len());
        let mut ship: Option<usize> = None;

        for (index, (body, &radius)) in config.bodies.iter().zip(radii).enumerate() {
            if bodies.iter().any(|b| b.name == body.name) {
                return Err(SceneError::DuplicateBody {
                    name: body.name.clone(),
                });
            }
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SceneError::DegenerateModel {
                    name: body.name.clone(),
                });
            }

            let parent = match &body.parent {
                None => None,
                Some(parent) => match bodies.iter().position(|b| &b.name == parent) {
                    Some(p) => Some(p),
                    None if config.bodies.iter().any(|b| &b.name == parent) => {
                        return Err(SceneError::ParentOrder {
                            body: body.name.clone(),
                            parent: parent.clone(),
                        })
                    }
                    None => return Err(SceneError::UnknownBody { name: parent.clone() }),
                },
            };

            let motion = if body.ship {
                if parent.is_some() {
                    return Err(SceneError::ShipWithParent {
                        name: body.name.clone(),
                    });
                }
                if let Some(first) = ship {
                    return Err(SceneError::MultipleShips {
                        first: bodies[first].name.clone(),
                        second: body.name.clone(),
                    });
                }
                ship = Some(index);
                Motion::Ship
            } else {
                Motion::Orbit {
                    radians: body.radians,
                    parent,
                }
            };

            bodies.push(Body {
                name: body.name.clone(),
                motion,
                scale: body.size / radius,
                translate: Vector3::from(body.translate),
                rotation: Matrix4::identity(),
                orientation: Matrix4::identity(),
            });
            let orientation = compose(&bodies, index);
            bodies[index].orientation = orientation;
        }

        Ok(Self {
            bodies,
            ship,
            ship_config: config.ship.clone(),
        })
    }

    /// Load every model named by `config` and build the scene.
    ///
    /// Model paths resolve against `base_dir`. Returns the draw buffers in
    /// body order.
    pub fn load(config: &SceneConfig, base_dir: &Path) -> Result<(Self, Vec<ModelBuffer>), LoadError> {
        let mut buffers = Vec::with_capacity(config.bodies.len());
        for body in &config.bodies {
            let path = config.model_path(base_dir, body);
            let mesh = load_tri(&path, body.vertices).map_err(|source| LoadError::Model {
                body: body.name.clone(),
                source,
            })?;
            buffers.push(ModelBuffer::from_mesh(&mesh));
        }

        let radii: Vec<f32> = buffers.iter().map(ModelBuffer::bounding_radius).collect();
        let scene = Self::build(config, &radii)?;
        info!("scene ready with {} bodies", scene.bodies.len());
        Ok((scene, buffers))
    }

    /// Advance every body by one update, consuming the steering input.
    pub fn update(&mut self, steer: &mut SteerInput) {
        for index in 0..self.bodies.len() {
            let saved = (self.bodies[index].rotation, self.bodies[index].translate);

            match self.bodies[index].motion {
                Motion::Orbit { radians, .. } => {
                    let body = &mut self.bodies[index];
                    body.rotation = Transform::rotate(&body.rotation, radians, &Vector3::y());
                }
                Motion::Ship => self.steer_ship(index, steer),
            }

            let orientation = compose(&self.bodies, index);
            let body = &mut self.bodies[index];
            if has_nan(&orientation) {
                error!("{} orientation became NaN, keeping the previous one", body.name);
                (body.rotation, body.translate) = saved;
                continue;
            }
            body.orientation = orientation;
            if matches!(body.motion, Motion::Ship) && !steer.is_idle() {
                debug!("{}", describe_mat4(&body.name, &body.orientation));
            }
        }
        steer.reset();
    }

    fn steer_ship(&mut self, index: usize, steer: &SteerInput) {
        let turn = self.ship_config.turn_radians;
        let speed = self.ship_config.speed;
        let body = &mut self.bodies[index];

        let mut rotation = body.rotation;
        rotation = Transform::rotate(&rotation, steer.pitch as f32 * turn, &Vector3::x());
        rotation = Transform::rotate(&rotation, steer.yaw as f32 * turn, &Vector3::y());
        rotation = Transform::rotate(&rotation, steer.roll as f32 * turn, &Vector3::z());
        body.rotation = rotation;
        body.translate = position(&body.orientation) + forward(&rotation) * (steer.thrust as f32 * speed);
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> &Body {
        &self.bodies[index]
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    pub fn ship(&self) -> Option<&Body> {
        self.ship.map(|i| &self.bodies[i])
    }
}

/// Orientation of `bodies[index]` from its rotation, translation and scale.
fn compose(bodies: &[Body], index: usize) -> Matrix4<f32> {
    let body = &bodies[index];
    let scale = Transform::uniform_scale(body.scale);
    let translate = Transform::translation(&body.translate);
    match body.motion {
        Motion::Orbit { parent: None, .. } => body.rotation * translate * scale,
        Motion::Orbit {
            parent: Some(parent), ..
        } => {
            let anchor = Transform::translation(&position(&bodies[parent].orientation));
            anchor * body.rotation * translate * scale
        }
        Motion::Ship => translate * body.rotation * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyConfig;
    use crate::input::SteerAxis;
    use crate::vecmath::{distance, up};
    use std::path::PathBuf;

    fn body(name: &str, size: f32, x: f32, radians: f32) -> BodyConfig {
        BodyConfig {
            name: name.to_string(),
            model: PathBuf::from(format!("{name}.tri")),
            vertices: None,
            size,
            translate: [x, 0.0, 0.0],
            radians,
            parent: None,
            ship: false,
        }
    }

    fn system() -> SceneConfig {
        SceneConfig {
            bodies: vec![
                body("sun", 100.0, 0.0, 0.0),
                body("planet", 10.0, 1000.0, 0.1),
                BodyConfig {
                    parent: Some("planet".into()),
                    ..body("moon", 5.0, 200.0, 0.3)
                },
                BodyConfig {
                    ship: true,
                    ..body("ship", 2.0, 3000.0, 0.0)
                },
            ],
            ..SceneConfig::default()
        }
    }

    fn build(config: &SceneConfig) -> Result<Scene, SceneError> {
        Scene::build(config, &vec![1.0; config.bodies.len()])
    }

    #[test]
    fn test_initial_orientation() {
        let scene = build(&system()).unwrap();
        let planet = scene.body(scene.find("planet").unwrap());
        assert_eq!(position(&planet.orientation), Vector3::new(1000.0, 0.0, 0.0));
        assert!((up(&planet.orientation).norm() - 10.0).abs() < 1e-4);

        let moon = scene.body(2);
        assert!((position(&moon.orientation) - Vector3::new(1200.0, 0.0, 0.0)).norm() < 1e-3);
        assert_eq!(position(&scene.ship().unwrap().orientation), Vector3::new(3000.0, 0.0, 0.0));
    }

    #[test]
    fn test_scale_uses_bounding_radius() {
        let config = system();
        let scene = Scene::build(&config, &[50.0, 2.0, 1.0, 4.0]).unwrap();
        assert_eq!(scene.body(0).scale, 2.0);
        assert_eq!(scene.body(1).scale, 5.0);
        assert_eq!(scene.body(3).scale, 0.5);
    }

    #[test]
    fn test_orbit_keeps_radius_and_moves() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        let before = position(&scene.body(1).orientation);
        scene.update(&mut steer);
        let after = position(&scene.body(1).orientation);

        assert!((after.norm() - 1000.0).abs() < 1e-2);
        assert!(distance(&before, &after) > 1.0);
        // A positive spin about Y carries +X towards −Z.
        assert!(after.z < 0.0);
        let expected = Vector3::new(1000.0 * 0.1_f32.cos(), 0.0, -1000.0 * 0.1_f32.sin());
        assert!((after - expected).norm() < 1e-2);
    }

    #[test]
    fn test_static_body_stays_put() {
        let mut scene = build(&system()).unwrap();
        let before = scene.body(0).orientation;
        let mut steer = SteerInput::default();
        for _ in 0..10 {
            scene.update(&mut steer);
        }
        assert_eq!(scene.body(0).orientation, before);
    }

    #[test]
    fn test_moon_follows_parent() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        for _ in 0..25 {
            scene.update(&mut steer);
            let planet = position(&scene.body(1).orientation);
            let moon = position(&scene.body(2).orientation);
            assert!((distance(&planet, &moon) - 200.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_moon_revolves_at_its_own_rate() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        for _ in 0..3 {
            scene.update(&mut steer);
        }

        let planet = position(&scene.body(1).orientation);
        let moon = position(&scene.body(2).orientation);
        let offset = moon - planet;
        // Three updates of 0.3 radians about Y, independent of the planet's 0.1.
        let angle = 3.0 * 0.3_f32;
        let expected = Vector3::new(200.0 * angle.cos(), 0.0, -200.0 * angle.sin());
        assert!(offset.z < 0.0);
        assert!((offset - expected).norm() < 1e-2, "{offset:?}");
    }

    #[test]
    fn test_ship_thrust_moves_forward() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        steer.nudge(SteerAxis::Thrust, 2);
        scene.update(&mut steer);

        let ship = scene.ship().unwrap();
        let speed = ShipConfig::default().speed;
        let expected = Vector3::new(3000.0, 0.0, -2.0 * speed);
        assert!((position(&ship.orientation) - expected).norm() < 1e-3);
        assert!(steer.is_idle());

        // Input was consumed, the next update leaves the ship where it is.
        scene.update(&mut steer);
        assert!((position(&scene.ship().unwrap().orientation) - expected).norm() < 1e-3);
    }

    #[test]
    fn test_ship_yaw_turns_heading() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        let turn = ShipConfig::default().turn_radians;
        steer.nudge(SteerAxis::Yaw, 10);
        scene.update(&mut steer);

        let ship = scene.ship().unwrap();
        let heading = forward(&ship.rotation);
        let expected = Vector3::new(-(10.0 * turn).sin(), 0.0, -(10.0 * turn).cos());
        assert!((heading - expected).norm() < 1e-5);
        // Turning in place does not move the ship.
        assert_eq!(position(&ship.orientation), Vector3::new(3000.0, 0.0, 0.0));
        // The model scale is applied after the rotation.
        assert!((forward(&ship.orientation).norm() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ship_pitch_then_thrust_climbs() {
        let mut scene = build(&system()).unwrap();
        let mut steer = SteerInput::default();
        steer.nudge(SteerAxis::Pitch, 5);
        steer.nudge(SteerAxis::Thrust, 1);
        scene.update(&mut steer);
        assert!(position(&scene.ship().unwrap().orientation).y > 0.0);
    }

    #[test]
    fn test_nan_update_is_rejected() {
        let mut config = system();
        config.ship.speed = f32::NAN;
        let mut scene = build(&config).unwrap();
        let mut steer = SteerInput::default();
        steer.nudge(SteerAxis::Thrust, 1);
        scene.update(&mut steer);

        let ship = scene.ship().unwrap();
        assert!(!has_nan(&ship.orientation));
        assert_eq!(ship.translate, Vector3::new(3000.0, 0.0, 0.0));
    }

    #[test]
    fn test_build_errors() {
        let mut config = system();
        config.bodies.swap(1, 2);
        assert!(matches!(build(&config), Err(SceneError::ParentOrder { .. })));

        let mut config = system();
        config.bodies[2].parent = Some("nowhere".into());
        assert!(matches!(build(&config), Err(SceneError::UnknownBody { .. })));

        let mut config = system();
        config.bodies[1].ship = true;
        assert!(matches!(build(&config), Err(SceneError::MultipleShips { .. })));

        let mut config = system();
        config.bodies[2].ship = true;
        config.bodies[3].ship = false;
        assert!(matches!(build(&config), Err(SceneError::ShipWithParent { .. })));

        let mut config = system();
        config.bodies[3].name = "sun".into();
        assert!(matches!(build(&config), Err(SceneError::DuplicateBody { .. })));

        let config = system();
        assert!(matches!(
            Scene::build(&config, &[1.0, 0.0, 1.0, 1.0]),
            Err(SceneError::DegenerateModel { .. })
        ));
        assert!(matches!(
            Scene::build(&config, &[1.0]),
            Err(SceneError::RadiusCount { expected: 4, found: 1 })
        ));
    }

    #[test]
    fn test_load_reports_missing_model() {
        let config = system();
        let err = Scene::load(&config, Path::new("/definitely/not/here")).unwrap_err();
        match err {
            LoadError::Model { body, source } => {
                assert_eq!(body, "sun");
                assert!(matches!(source, TriError::Io { .. }));
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
