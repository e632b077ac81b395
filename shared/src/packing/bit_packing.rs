use crate::PackingError;

/// Width of one packed field. Negative widths mark signed fields, so `-11`
/// stores values in `-1024..=1023` using 11 bits.
pub type FieldWidth = i8;

fn bits_of(width: FieldWidth) -> u32 {
    u32::from(width.unsigned_abs())
}

fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Offset added to signed fields so they are stored as unsigned values.
/// `width` must already be validated.
fn bias(width: FieldWidth) -> i64 {
    if width < 0 {
        1i64 << (bits_of(width) - 1)
    } else {
        0
    }
}

/// A field must hold between 1 and 63 bits.
fn check_width(index: usize, width: FieldWidth) -> Result<u32, PackingError> {
    let bits = bits_of(width);
    if bits == 0 || bits > 63 {
        return Err(PackingError::InvalidWidth { index, width });
    }
    Ok(bits)
}

/// Largest value a field of `width` can hold.
pub fn try_max_value(width: FieldWidth) -> Result<i64, PackingError> {
    let bits = check_width(0, width)?;
    if width < 0 {
        Ok(bias(width) - 1)
    } else {
        Ok(mask(bits) as i64)
    }
}

/// Largest value a field can hold.
///
/// # Panics
///
/// Panics if `width` is zero or wider than 63 bits.
pub fn max_value(width: FieldWidth) -> i64 {
    try_max_value(width).expect("invalid field width")
}

/// Smallest value a field of `width` can hold.
pub fn try_min_value(width: FieldWidth) -> Result<i64, PackingError> {
    check_width(0, width)?;
    Ok(-bias(width))
}

/// Smallest value a field can hold.
///
/// # Panics
///
/// Panics if `width` is zero or wider than 63 bits.
pub fn min_value(width: FieldWidth) -> i64 {
    try_min_value(width).expect("invalid field width")
}

/// Limits `value` to what a field of `width` can hold.
pub fn try_clamp(value: i64, width: FieldWidth) -> Result<i64, PackingError> {
    Ok(value.clamp(try_min_value(width)?, try_max_value(width)?))
}

/// # Panics
///
/// Panics if `width` is zero or wider than 63 bits.
pub fn clamp(value: i64, width: FieldWidth) -> i64 {
    try_clamp(value, width).expect("invalid field width")
}

pub(crate) fn check_layout(widths: &[FieldWidth]) -> Result<(), PackingError> {
    let mut total = 0;
    for (index, width) in widths.iter().enumerate() {
        total += check_width(index, *width)?;
    }
    if total > 64 {
        return Err(PackingError::LayoutTooWide { bits: total });
    }
    Ok(())
}

/// Packs `values` into one word, first field in the most significant bits.
/// Out-of-range values wrap around within their field.
pub fn try_pack(widths: &[FieldWidth], values: &[i64]) -> Result<u64, PackingError> {
    if widths.len() != values.len() {
        return Err(PackingError::LengthMismatch {
            fields: widths.len(),
            values: values.len(),
        });
    }
    check_layout(widths)?;

    let mut packed: u64 = 0;
    for (width, value) in widths.iter().zip(values) {
        let bits = bits_of(*width);
        let stored = value.wrapping_add(bias(*width)) as u64 & mask(bits);
        packed = (packed << bits) | stored;
    }
    Ok(packed)
}

/// Packs `values` into one word.
///
/// # Panics
///
/// Panics if the layout is invalid or does not match `values`.
pub fn pack(widths: &[FieldWidth], values: &[i64]) -> u64 {
    try_pack(widths, values).expect("invalid bit packing layout")
}

/// Splits a word produced by [`try_pack`] back into its fields.
pub fn try_unpack(widths: &[FieldWidth], mut packed: u64) -> Result<Vec<i64>, PackingError> {
    check_layout(widths)?;

    let mut values = vec![0; widths.len()];
    for (index, width) in widths.iter().enumerate().rev() {
        let bits = bits_of(*width);
        values[index] = (packed & mask(bits)) as i64 - bias(*width);
        packed >>= bits;
    }
    Ok(values)
}

/// Splits a word produced by [`pack`] back into its fields.
///
/// # Panics
///
/// Panics if the layout is invalid.
pub fn unpack(widths: &[FieldWidth], packed: u64) -> Vec<i64> {
    try_unpack(widths, packed).expect("invalid bit packing layout")
}
