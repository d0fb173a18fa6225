//! Ruber core library - model loading and transform updates
//!
//! This library holds everything the Ruber system does apart from drawing:
//! the `.tri` model parser and draw buffers, matrix helpers, the per-update
//! motion of orbiting bodies and the ship, cameras, timers and the keyboard
//! command set.

pub mod buffer;
pub mod camera;
pub mod clock;
pub mod config;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod session;
pub mod transform;
pub mod tri;
pub mod vecmath;

// Re-export commonly used types
pub use buffer::ModelBuffer;
pub use camera::{Camera, CameraFrame, FollowCamera, ProjectionMode, ViewPreset};
pub use clock::{FpsCounter, FrameClock, TimerMode};
pub use config::{ConfigError, SceneConfig};
pub use geometry::{Mesh, Triangle, Vertex};
pub use input::{Command, SteerAxis, SteerInput};
pub use scene::{Body, LoadError, Motion, Scene, SceneError};
pub use session::{Flow, Session, View};
pub use transform::Transform;
pub use tri::{load_tri, parse_tri, TriError};
