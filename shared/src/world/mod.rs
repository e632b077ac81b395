pub mod capability;
pub mod identity;
pub mod math;
pub mod world_type;
