//! The orrery application: window and event handling, the simulation clock,
//! the free camera, and the renderer that draws the solar system each frame.

pub mod camera_controller;
pub mod error;
pub mod game_loop;
pub mod platform;
pub mod renderer;
pub mod sim_clock;
pub mod window;

pub use error::AppError;
pub use window::{AppState, run};
