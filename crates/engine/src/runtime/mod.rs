//! Async runtime around the frame hooks: the frame loop, the phone relay
//! link and the master to render node link.

pub mod cluster;
pub mod driver;
pub mod relay;

pub use driver::{run_client, run_master};
