//! Message definitions for the dome arcade.
//!
//! `sync` is the binary master -> render client frame, `control` is the
//! text protocol spoken with the phone relay.

mod control;
mod sync;

pub use control::*;
pub use sync::*;
