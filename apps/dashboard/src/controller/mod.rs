//! Controller layer: session state, navigation rules and command dispatch.

pub mod navigation;
mod state;

pub use state::Controller;
