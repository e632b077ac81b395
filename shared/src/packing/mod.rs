pub mod bit_packing;
pub mod error;
pub mod quantize;
