use bitflags::bitflags;

bitflags! {
    /// Capabilities a behavior declares when it is registered on an entity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Carries both position and rotation. Wins over `POSITION`.
        const POSITION_ROTATION = 1 << 0;
        /// Carries position only.
        const POSITION = 1 << 1;
        const PHYSICS_3D = 1 << 2;
        /// Planar body. Ignored when a `PHYSICS_3D` behavior is present.
        const PHYSICS_2D = 1 << 3;
        const STATE_MIGRATABLE = 1 << 4;
    }
}

impl Capabilities {
    pub fn has_transform(&self) -> bool {
        self.intersects(Capabilities::POSITION_ROTATION | Capabilities::POSITION)
    }

    pub fn has_physics_body(&self) -> bool {
        self.intersects(Capabilities::PHYSICS_3D | Capabilities::PHYSICS_2D)
    }
}
