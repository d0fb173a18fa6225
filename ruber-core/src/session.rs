//! Interactive state of a running system: the scene plus everything the
//! keyboard can change. Frontends feed it commands and clock readings and
//! read back the camera, the render flags and the title text.

use std::time::Instant;

use log::debug;
use nalgebra::{Matrix4, Vector3};

use crate::camera::{Camera, FollowCamera, ProjectionMode, ViewPreset};
use crate::clock::{FpsCounter, FrameClock};
use crate::config::SceneConfig;
use crate::input::{Command, SteerInput};
use crate::scene::{Motion, Scene, SceneError};
use crate::vecmath::{acos_dot_product, distance, forward, position};

const BASE_TITLE: &str = "Ruber {a, w, f, t, b, h, v, o, p, q} : ";

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Where the camera currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Preset(ViewPreset),
    /// Index into the follow cameras.
    Follow(usize),
}

pub struct Session {
    scene: Scene,
    camera: Camera,
    followers: Vec<FollowCamera>,
    view: View,
    last_preset: ViewPreset,
    distance: f32,
    clock: FrameClock,
    fps: FpsCounter,
    steer: SteerInput,
    wireframe: bool,
}

impl Session {
    pub fn new(scene: Scene, config: &SceneConfig, now: Instant) -> Result<Self, SceneError> {
        let followers = config
            .cameras
            .iter()
            .map(|c| {
                let body = scene.find(&c.body).ok_or_else(|| SceneError::UnknownBody {
                    name: c.body.clone(),
                })?;
                Ok(FollowCamera {
                    name: c.name.clone(),
                    body,
                    offset: Vector3::from(c.offset),
                    frame: c.frame,
                    up: Vector3::from(c.up),
                })
            })
            .collect::<Result<Vec<_>, SceneError>>()?;

        let mut camera = Camera::default();
        camera.fov = config.camera.fov_degrees.to_radians();
        camera.near = config.camera.near;
        camera.far = config.camera.far;

        let preset = config.camera.initial_view;
        let mut session = Self {
            scene,
            camera,
            followers,
            view: View::Preset(preset),
            last_preset: preset,
            distance: config.camera.distance,
            clock: FrameClock::new(&config.timing, now),
            fps: FpsCounter::new(now),
            steer: SteerInput::default(),
            wireframe: false,
        };
        session.refresh_camera();
        Ok(session)
    }

    pub fn apply(&mut self, command: Command, now: Instant) -> Flow {
        debug!("command {command:?}");
        match command {
            Command::Quit => return Flow::Quit,
            Command::ToggleTimer => self.clock.toggle(now),
            Command::View(preset) => {
                self.view = View::Preset(preset);
                self.last_preset = preset;
            }
            Command::NextCamera => {
                self.view = match self.view {
                    _ if self.followers.is_empty() => View::Preset(self.last_preset),
                    View::Preset(_) => View::Follow(0),
                    View::Follow(i) if i + 1 < self.followers.len() => View::Follow(i + 1),
                    View::Follow(_) => View::Preset(self.last_preset),
                };
            }
            Command::ToggleWireframe => self.wireframe = !self.wireframe,
            Command::Projection(mode) => self.camera.mode = mode,
            Command::Steer(axis, amount) => {
                if self.scene.ship().is_some() {
                    self.steer.nudge(axis, amount);
                }
            }
        }
        self.refresh_camera();
        Flow::Continue
    }

    /// Run a scene update if the timer says one is due.
    pub fn poll_tick(&mut self, now: Instant) -> bool {
        if !self.clock.poll(now) {
            return false;
        }
        self.tick();
        true
    }

    /// Advance the scene by one update.
    pub fn tick(&mut self) {
        self.scene.update(&mut self.steer);
        self.refresh_camera();
    }

    /// Count a rendered frame; true when the fps estimate changed.
    pub fn frame_rendered(&mut self, now: Instant) -> bool {
        self.fps.frame(now).is_some()
    }

    fn refresh_camera(&mut self) {
        let (eye, at, up) = match self.view {
            View::Preset(preset) => preset.pose(self.distance),
            View::Follow(i) => {
                let follower = &self.followers[i];
                follower.pose(&self.scene.body(follower.body).orientation)
            }
        };
        self.camera.look(eye, at, up);
    }

    pub fn view_label(&self) -> &str {
        match self.view {
            View::Preset(preset) => preset.label(),
            View::Follow(i) => &self.followers[i].name,
        }
    }

    /// Window title: view, projection, timer, frame rate and ship telemetry.
    pub fn title(&self) -> String {
        let projection = match self.camera.mode {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "orthographic",
        };
        let mut title = format!(
            "{BASE_TITLE}{}, {projection}, {}",
            self.view_label(),
            self.clock.mode().label()
        );
        if let Some(fps) = self.fps.fps() {
            title.push_str(&format!(", fps {fps:4}"));
        }
        if let Some(telemetry) = self.ship_telemetry() {
            title.push_str(&telemetry);
        }
        if self.wireframe {
            title.push_str(", wireframe");
        }
        title
    }

    /// Distance from the ship to the first other body and the angle
    /// between the ship's heading and that body.
    fn ship_telemetry(&self) -> Option<String> {
        let ship = self.scene.ship()?;
        let anchor = self
            .scene
            .bodies()
            .iter()
            .find(|b| !matches!(b.motion, Motion::Ship))?;

        let from = position(&ship.orientation);
        let to = position(&anchor.orientation);
        let range = distance(&from, &to);
        let mut text = format!(" | {} {range:.0} from {}", ship.name, anchor.name);
        if let Some(direction) = (to - from).try_normalize(f32::EPSILON) {
            let bearing = acos_dot_product(forward(&ship.rotation).dot(&direction));
            text.push_str(&format!(", bearing {:.0}°", bearing.to_degrees()));
        }
        Some(text)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Current model matrix of each body, in body order.
    pub fn model_matrices(&self) -> impl Iterator<Item = &Matrix4<f32>> + '_ {
        self.scene.bodies().iter().map(|b| &b.orientation)
    }
}
