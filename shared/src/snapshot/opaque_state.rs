use naia_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr, MTU_SIZE_BITS};
use thiserror::Error;

/// Errors that can occur while encoding or decoding opaque behavior state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Encoded state does not fit in a single packet
    #[error("Opaque state needs {bits} bits, limit is {limit}")]
    TooLarge { bits: u32, limit: u32 },

    /// Bytes could not be decoded as opaque state
    #[error("Malformed opaque state payload")]
    Malformed,
}

/// A single value inside [`OpaqueState`].
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<StateValue>),
}

impl StateValue {
    const TAG_BOOL: u8 = 0;
    const TAG_INT: u8 = 1;
    const TAG_FLOAT: u8 = 2;
    const TAG_TEXT: u8 = 3;
    const TAG_BYTES: u8 = 4;
    const TAG_LIST: u8 = 5;

    fn tag(&self) -> u8 {
        match self {
            StateValue::Bool(_) => Self::TAG_BOOL,
            StateValue::Int(_) => Self::TAG_INT,
            StateValue::Float(_) => Self::TAG_FLOAT,
            StateValue::Text(_) => Self::TAG_TEXT,
            StateValue::Bytes(_) => Self::TAG_BYTES,
            StateValue::List(_) => Self::TAG_LIST,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(i64::from(value))
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<Vec<u8>> for StateValue {
    fn from(value: Vec<u8>) -> Self {
        StateValue::Bytes(value)
    }
}

impl Serde for StateValue {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.tag().ser(writer);
        match self {
            StateValue::Bool(value) => value.ser(writer),
            StateValue::Int(value) => value.ser(writer),
            // floats travel as their raw bit pattern so NaN payloads survive
            StateValue::Float(value) => value.to_bits().ser(writer),
            StateValue::Text(value) => value.ser(writer),
            StateValue::Bytes(value) => value.ser(writer),
            StateValue::List(values) => values.ser(writer),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let tag = u8::de(reader)?;
        match tag {
            Self::TAG_BOOL => Ok(StateValue::Bool(bool::de(reader)?)),
            Self::TAG_INT => Ok(StateValue::Int(i64::de(reader)?)),
            Self::TAG_FLOAT => Ok(StateValue::Float(f64::from_bits(u64::de(reader)?))),
            Self::TAG_TEXT => Ok(StateValue::Text(String::de(reader)?)),
            Self::TAG_BYTES => Ok(StateValue::Bytes(Vec::<u8>::de(reader)?)),
            Self::TAG_LIST => Ok(StateValue::List(Vec::<StateValue>::de(reader)?)),
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        let payload = match self {
            StateValue::Bool(value) => value.bit_length(),
            StateValue::Int(value) => value.bit_length(),
            StateValue::Float(value) => value.to_bits().bit_length(),
            StateValue::Text(value) => value.bit_length(),
            StateValue::Bytes(value) => value.bit_length(),
            StateValue::List(values) => values.bit_length(),
        };
        self.tag().bit_length() + payload
    }
}

/// Order-sensitive list of values a behavior hands over for migration. The
/// snapshot stores and restores it verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpaqueState {
    values: Vec<StateValue>,
}

impl OpaqueState {
    pub fn new(values: Vec<StateValue>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[StateValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&StateValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: impl Into<StateValue>) {
        self.values.push(value.into());
    }

    pub fn into_values(self) -> Vec<StateValue> {
        self.values
    }

    /// Encodes into a single packet-sized buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        let bits = self.bit_length();
        if bits > MTU_SIZE_BITS {
            return Err(StateError::TooLarge {
                bits,
                limit: MTU_SIZE_BITS,
            });
        }

        let mut writer = BitWriter::new();
        self.ser(&mut writer);
        let bytes = writer.to_bytes();
        Ok(bytes.to_vec())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        let mut reader = BitReader::new(bytes);
        Self::de(&mut reader).map_err(|_| StateError::Malformed)
    }
}

impl<V: Into<StateValue>> FromIterator<V> for OpaqueState {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Serde for OpaqueState {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.values.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::new(Vec::<StateValue>::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.values.bit_length()
    }
}

/// Builds an [`OpaqueState`] from heterogeneous values.
///
/// ```
/// # use reprise_shared::{opaque_state, StateValue};
/// let state = opaque_state!["hp", 42];
/// assert_eq!(state.get(1), Some(&StateValue::Int(42)));
/// ```
#[macro_export]
macro_rules! opaque_state {
    () => {
        $crate::OpaqueState::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::OpaqueState::new(vec![$($crate::StateValue::from($value)),+])
    };
}
