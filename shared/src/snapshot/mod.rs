pub mod config;
pub mod error;
pub mod local_state;
pub mod manager;
pub mod opaque_state;
pub mod recorder;
pub mod reproducer;
pub mod snapshot;
