//! Property-based test generators using proptest.
//!
//! Provides strategies for column values, object names and column stream
//! operations.

use proptest::prelude::*;

/// A value of one of the fixed-width column types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// `JET_coltypBit`.
    Bool(bool),
    /// `JET_coltypUnsignedByte`.
    Byte(u8),
    /// A signed byte in a `JET_coltypUnsignedByte` column.
    SignedByte(i8),
    /// `JET_coltypShort`.
    Int16(i16),
    /// `JET_coltypUnsignedShort`.
    UInt16(u16),
    /// `JET_coltypLong`.
    Int32(i32),
    /// `JET_coltypUnsignedLong`.
    UInt32(u32),
    /// `JET_coltypLongLong`.
    Int64(i64),
    /// `JET_coltypIEEESingle`.
    Float(f32),
    /// `JET_coltypIEEEDouble`.
    Double(f64),
    /// `JET_coltypGUID`.
    Guid(uuid::Uuid),
}

impl ScalarValue {
    /// The column type that stores this value.
    pub fn column_type(&self) -> esent_native::ColumnType {
        use esent_native::ColumnType;
        match self {
            Self::Bool(_) => ColumnType::Bit,
            Self::Byte(_) | Self::SignedByte(_) => ColumnType::UnsignedByte,
            Self::Int16(_) => ColumnType::Short,
            Self::UInt16(_) => ColumnType::UnsignedShort,
            Self::Int32(_) => ColumnType::Long,
            Self::UInt32(_) => ColumnType::UnsignedLong,
            Self::Int64(_) => ColumnType::LongLong,
            Self::Float(_) => ColumnType::IEEESingle,
            Self::Double(_) => ColumnType::IEEEDouble,
            Self::Guid(_) => ColumnType::Guid,
        }
    }
}

/// Strategy for values of every fixed-width type. Floats are finite so that
/// values compare equal after a round trip.
pub fn scalar_value_strategy() -> impl Strategy<Value = ScalarValue> {
    prop_oneof![
        any::<bool>().prop_map(ScalarValue::Bool),
        any::<u8>().prop_map(ScalarValue::Byte),
        any::<i8>().prop_map(ScalarValue::SignedByte),
        any::<i16>().prop_map(ScalarValue::Int16),
        any::<u16>().prop_map(ScalarValue::UInt16),
        any::<i32>().prop_map(ScalarValue::Int32),
        any::<u32>().prop_map(ScalarValue::UInt32),
        any::<i64>().prop_map(ScalarValue::Int64),
        prop::num::f32::NORMAL.prop_map(ScalarValue::Float),
        prop::num::f64::NORMAL.prop_map(ScalarValue::Double),
        any::<[u8; 16]>().prop_map(|bytes| ScalarValue::Guid(uuid::Uuid::from_bytes(bytes))),
    ]
}

/// Strategy for valid table, column and index names.
pub fn object_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for text in the ASCII code page.
pub fn ascii_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,64}").expect("Invalid regex")
}

/// Strategy for arbitrary Unicode text.
pub fn unicode_text_strategy() -> impl Strategy<Value = String> {
    any::<String>()
}

/// Strategy for long values up to `max_len` bytes.
pub fn long_value_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for a set of distinct record keys.
pub fn key_set_strategy(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::btree_set(any::<i32>(), 0..=max_len)
        .prop_map(|keys| keys.into_iter().collect())
}

/// An operation on a column stream.
#[derive(Debug, Clone)]
pub enum StreamOp {
    /// Seek to `offset` and write `data`.
    Write {
        /// Absolute offset.
        offset: u64,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Seek to `offset` and read up to `len` bytes.
    Read {
        /// Absolute offset.
        offset: u64,
        /// Maximum bytes to read.
        len: usize,
    },
    /// Truncate or extend to `len`.
    SetLen {
        /// New length.
        len: u64,
    },
}

/// Strategy for stream operations within the first `extent` bytes.
pub fn stream_op_strategy(extent: u64) -> impl Strategy<Value = StreamOp> {
    prop_oneof![
        (0..extent, prop::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(offset, data)| StreamOp::Write { offset, data }),
        (0..extent, 0usize..64).prop_map(|(offset, len)| StreamOp::Read { offset, len }),
        (0..extent).prop_map(|len| StreamOp::SetLen { len }),
    ]
}

/// Strategy for a sequence of stream operations.
pub fn stream_ops_strategy(extent: u64, max_ops: usize) -> impl Strategy<Value = Vec<StreamOp>> {
    prop::collection::vec(stream_op_strategy(extent), 1..=max_ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn object_names_are_valid(name in object_name_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.len() <= 32);
        }

        #[test]
        fn keys_are_distinct(keys in key_set_strategy(20)) {
            let mut sorted = keys.clone();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), keys.len());
        }

        #[test]
        fn ascii_text_is_ascii(text in ascii_text_strategy()) {
            prop_assert!(text.is_ascii());
        }
    }
}
