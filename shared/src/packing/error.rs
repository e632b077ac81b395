use thiserror::Error;

/// Errors that can occur while packing values into fixed-width bit fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackingError {
    /// The number of values does not match the number of fields
    #[error("Layout has {fields} fields but {values} values were given")]
    LengthMismatch { fields: usize, values: usize },

    /// A field width is zero or does not fit in 63 bits
    #[error("Invalid field width {width} at index {index}")]
    InvalidWidth { index: usize, width: i8 },

    /// The fields together need more than 64 bits
    #[error("Layout needs {bits} bits, at most 64 fit")]
    LayoutTooWide { bits: u32 },
}
