use crate::{
    packing::bit_packing::{check_layout, clamp, pack, try_pack, try_unpack, unpack, FieldWidth},
    PackingError, Vec2, Vec3,
};

/// Fixed-point encoding of a 3D vector into one word.
///
/// Components are measured from `center` in steps of `unit`. Out-of-range
/// components clamp to the field limits, or wrap around when `wrap` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Vec3Quantizer {
    pub unit: f32,
    pub center: Vec3,
    pub wrap: bool,
    pub widths: [FieldWidth; 3],
}

impl Vec3Quantizer {
    pub fn new(unit: f32, widths: [FieldWidth; 3]) -> Self {
        Self {
            unit,
            center: Vec3::ZERO,
            wrap: false,
            widths,
        }
    }

    /// Millimetre steps over roughly ±2 km horizontally, ±500 m vertically.
    pub fn wide() -> Self {
        Self::new(0.001, [-22, -20, -22])
    }

    /// Centimetre steps over roughly ±10 m horizontally, ±5 m vertically.
    /// Fits in 32 bits.
    pub fn compact() -> Self {
        Self::new(0.01, [-11, -10, -11])
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn wrapping(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn try_pack(&self, vector: Vec3) -> Result<u64, PackingError> {
        check_layout(&self.widths)?;
        let local = vector - self.center;
        let values = [
            quantize(local.x, self.unit, self.widths[0], self.wrap),
            quantize(local.y, self.unit, self.widths[1], self.wrap),
            quantize(local.z, self.unit, self.widths[2], self.wrap),
        ];
        try_pack(&self.widths, &values)
    }

    /// # Panics
    ///
    /// Panics if `widths` is not a valid layout.
    pub fn pack(&self, vector: Vec3) -> u64 {
        self.try_pack(vector).expect("invalid quantizer layout")
    }

    pub fn try_unpack(&self, packed: u64) -> Result<Vec3, PackingError> {
        let values = try_unpack(&self.widths, packed)?;
        Ok(Vec3::new(
            values[0] as f32 * self.unit,
            values[1] as f32 * self.unit,
            values[2] as f32 * self.unit,
        ) + self.center)
    }

    pub fn unpack(&self, packed: u64) -> Vec3 {
        self.try_unpack(packed).expect("invalid quantizer layout")
    }
}

/// Fixed-point encoding of a 2D vector into one word.
#[derive(Clone, Debug, PartialEq)]
pub struct Vec2Quantizer {
    pub unit: f32,
    pub center: Vec2,
    pub wrap: bool,
    pub widths: [FieldWidth; 2],
}

impl Vec2Quantizer {
    pub fn new(unit: f32, widths: [FieldWidth; 2]) -> Self {
        Self {
            unit,
            center: Vec2::ZERO,
            wrap: false,
            widths,
        }
    }

    /// Millimetre steps over ±32 m. Fits in 32 bits.
    pub fn wide() -> Self {
        Self::new(0.001, [-16, -16])
    }

    /// Millimetre steps over ±12 cm. Fits in 16 bits.
    pub fn compact() -> Self {
        Self::new(0.001, [-8, -8])
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn wrapping(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn try_pack(&self, vector: Vec2) -> Result<u64, PackingError> {
        check_layout(&self.widths)?;
        let values = [
            quantize(vector.x - self.center.x, self.unit, self.widths[0], self.wrap),
            quantize(vector.y - self.center.y, self.unit, self.widths[1], self.wrap),
        ];
        try_pack(&self.widths, &values)
    }

    /// # Panics
    ///
    /// Panics if `widths` is not a valid layout.
    pub fn pack(&self, vector: Vec2) -> u64 {
        self.try_pack(vector).expect("invalid quantizer layout")
    }

    pub fn try_unpack(&self, packed: u64) -> Result<Vec2, PackingError> {
        let values = try_unpack(&self.widths, packed)?;
        Ok(Vec2::new(
            values[0] as f32 * self.unit + self.center.x,
            values[1] as f32 * self.unit + self.center.y,
        ))
    }

    pub fn unpack(&self, packed: u64) -> Vec2 {
        self.try_unpack(packed).expect("invalid quantizer layout")
    }
}

/// `width` must belong to a checked layout.
fn quantize(value: f32, unit: f32, width: FieldWidth, wrap: bool) -> i64 {
    let steps = (value / unit).round() as i64;
    if wrap {
        steps
    } else {
        clamp(steps, width)
    }
}

fn repeat_degrees(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

/// Packs an angle in degrees with 0.01° precision.
pub fn pack_angle(degrees: f32) -> u16 {
    ((repeat_degrees(degrees) * 100.0).round() as u32 % 36_000) as u16
}

pub fn unpack_angle(packed: u16) -> f32 {
    f32::from(packed) * 0.01
}

const EULER_COMPACT: [FieldWidth; 3] = [10, 10, 10];
const EULER_WIDE: [FieldWidth; 3] = [20, 20, 20];

fn pack_euler(euler_degrees: Vec3, widths: &[FieldWidth; 3], steps_per_degree: f32) -> u64 {
    let full_turn = (360.0 * steps_per_degree) as i64;
    let encode = |degrees: f32| {
        (repeat_degrees(degrees) * steps_per_degree).round() as i64 % full_turn
    };
    pack(
        widths,
        &[
            encode(euler_degrees.x),
            encode(euler_degrees.y),
            encode(euler_degrees.z),
        ],
    )
}

fn unpack_euler(packed: u64, widths: &[FieldWidth; 3], steps_per_degree: f32) -> Vec3 {
    let values = unpack(widths, packed);
    let decode = |steps: i64| repeat_degrees(steps as f32 / steps_per_degree);
    Vec3::new(decode(values[0]), decode(values[1]), decode(values[2]))
}

/// Packs Euler angles in degrees at 0.5° precision into 30 bits.
pub fn pack_euler_compact(euler_degrees: Vec3) -> u32 {
    pack_euler(euler_degrees, &EULER_COMPACT, 2.0) as u32
}

pub fn unpack_euler_compact(packed: u32) -> Vec3 {
    unpack_euler(u64::from(packed), &EULER_COMPACT, 2.0)
}

/// Packs Euler angles in degrees at 0.0005° precision into 60 bits.
pub fn pack_euler_wide(euler_degrees: Vec3) -> u64 {
    pack_euler(euler_degrees, &EULER_WIDE, 2000.0)
}

pub fn unpack_euler_wide(packed: u64) -> Vec3 {
    unpack_euler(packed, &EULER_WIDE, 2000.0)
}

pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_be_bytes([r, g, b, a])
}

pub fn unpack_rgba(packed: u32) -> [u8; 4] {
    packed.to_be_bytes()
}
