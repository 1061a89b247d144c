//! Replicated dome arcade simulation.
//!
//! One master node runs the game and pushes a sync frame every frame; render
//! nodes mirror it. Phones steer players through a text relay.

pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod node;
pub mod pool;
pub mod position;
pub mod runtime;
pub mod session;
pub mod spawn;
pub mod sync;

// Re-export commonly used types
pub use config::{Config, Role, StartPolicy};
pub use error::GameError;
pub use game::{Game, TickSummary};
pub use node::{ClientNode, FrameHooks, MasterNode};
pub use position::SphericalPosition;
pub use runtime::{run_client, run_master};
