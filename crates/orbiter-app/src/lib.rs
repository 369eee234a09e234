//! Orbiter application: window, event loop and frame clock around the
//! orbiting text scene.

pub mod clock;
pub mod platform;
pub mod window;
