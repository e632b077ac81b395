pub type Tick = u16;
