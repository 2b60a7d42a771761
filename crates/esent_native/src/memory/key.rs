//! Normalized index keys.
//!
//! A key is the concatenation of one normalized segment per index column.
//! Normalized keys compare correctly with a plain byte comparison.

use crate::codes::{err, JetErr};
use crate::grbit::MakeKeyGrbit;
use crate::types::{CodePage, ColumnType};

const NULL_LOW: u8 = 0x00;
const NULL_HIGH: u8 = 0xFE;
const PRESENT: u8 = 0x7F;
const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0x01;

/// Appended after a key made with an end limit.
pub(super) const END_LIMIT: u8 = 0xFF;

/// How one index segment is normalized.
#[derive(Debug, Clone, Copy)]
pub(super) struct SegmentKind {
    pub coltyp: ColumnType,
    pub cp: CodePage,
    pub descending: bool,
    pub nulls_high: bool,
}

/// Normalizes one segment value. `prefix` leaves variable-length values open
/// so that the segment matches every value it is a prefix of.
pub(super) fn normalize_segment(kind: SegmentKind, value: Option<&[u8]>, prefix: bool) -> Vec<u8> {
    let mut out = Vec::new();
    match value {
        None => out.push(if kind.nulls_high { NULL_HIGH } else { NULL_LOW }),
        Some(data) => {
            out.push(PRESENT);
            append_payload(&mut out, kind, data, prefix);
        }
    }
    if kind.descending {
        for byte in &mut out {
            *byte = !*byte;
        }
    }
    out
}

fn append_payload(out: &mut Vec<u8>, kind: SegmentKind, data: &[u8], prefix: bool) {
    match kind.coltyp {
        ColumnType::Bit => out.push(u8::from(data.first().copied().unwrap_or(0) != 0)),
        ColumnType::UnsignedByte | ColumnType::Guid => out.extend_from_slice(data),
        ColumnType::Short | ColumnType::Long | ColumnType::LongLong | ColumnType::Currency => {
            let start = out.len();
            out.extend(data.iter().rev());
            if let Some(high) = out.get_mut(start) {
                *high ^= 0x80;
            }
        }
        ColumnType::UnsignedShort | ColumnType::UnsignedLong => out.extend(data.iter().rev()),
        ColumnType::IEEESingle | ColumnType::IEEEDouble | ColumnType::DateTime => {
            let start = out.len();
            out.extend(data.iter().rev());
            let negative = out.get(start).is_some_and(|high| high & 0x80 != 0);
            if negative {
                for byte in &mut out[start..] {
                    *byte = !*byte;
                }
            } else if let Some(high) = out.get_mut(start) {
                *high ^= 0x80;
            }
        }
        ColumnType::Text | ColumnType::LongText => {
            let folded = fold_text(data, kind.cp);
            escape_into(out, folded.as_bytes(), prefix);
        }
        ColumnType::Nil | ColumnType::Binary | ColumnType::LongBinary => {
            escape_into(out, data, prefix);
        }
    }
}

fn escape_into(out: &mut Vec<u8>, data: &[u8], prefix: bool) {
    for &byte in data {
        match byte {
            0x00 => out.extend_from_slice(&[ESCAPE, 0x01]),
            0x01 => out.extend_from_slice(&[ESCAPE, 0x02]),
            other => out.push(other),
        }
    }
    if !prefix {
        out.push(TERMINATOR);
    }
}

/// Case-folds text for comparison.
fn fold_text(data: &[u8], cp: CodePage) -> String {
    let text: String = if cp == CodePage::UNICODE {
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        data.iter().map(|&b| char::from(b)).collect()
    };
    text.to_lowercase()
}

/// Limit flags carried by the last segment of a search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Limit {
    None,
    Start,
    End,
}

/// A search key under construction.
#[derive(Debug, Clone, Default)]
pub(super) struct SearchKey {
    pub bytes: Vec<u8>,
    pub segments: usize,
    pub limited: bool,
}

impl SearchKey {
    /// Applies one `JetMakeKey` call.
    pub(super) fn append(
        current: Option<Self>,
        kinds: &[SegmentKind],
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> Result<Self, JetErr> {
        let mut key = if grbit.contains(MakeKeyGrbit::NEW_KEY) {
            Self::default()
        } else {
            current.ok_or(err::KEY_NOT_MADE)?
        };

        if grbit.contains(MakeKeyGrbit::NORMALIZED_KEY) {
            key.bytes = data.unwrap_or_default().to_vec();
            key.segments = kinds.len();
            key.limited = false;
            return Ok(key);
        }

        if key.limited || key.segments >= kinds.len() {
            return Err(err::KEY_IS_MADE);
        }
        let kind = kinds[key.segments];

        let limit = if grbit.intersects(
            MakeKeyGrbit::FULL_COLUMN_END_LIMIT
                | MakeKeyGrbit::PARTIAL_COLUMN_END_LIMIT
                | MakeKeyGrbit::STR_LIMIT,
        ) {
            Limit::End
        } else if grbit.intersects(
            MakeKeyGrbit::FULL_COLUMN_START_LIMIT
                | MakeKeyGrbit::PARTIAL_COLUMN_START_LIMIT
                | MakeKeyGrbit::SUB_STR_LIMIT,
        ) {
            Limit::Start
        } else {
            Limit::None
        };
        let partial = grbit.intersects(
            MakeKeyGrbit::PARTIAL_COLUMN_END_LIMIT
                | MakeKeyGrbit::PARTIAL_COLUMN_START_LIMIT
                | MakeKeyGrbit::STR_LIMIT
                | MakeKeyGrbit::SUB_STR_LIMIT,
        );

        let value = match data {
            Some(bytes) if !bytes.is_empty() => Some(bytes),
            Some(bytes) if grbit.contains(MakeKeyGrbit::KEY_DATA_ZERO_LENGTH) => Some(bytes),
            _ => None,
        };
        if let (Some(bytes), Some(width)) = (value, kind.coltyp.fixed_size()) {
            if bytes.len() != width {
                return Err(err::INVALID_BUFFER_SIZE);
            }
        }

        key.bytes.extend(normalize_segment(kind, value, partial));
        key.segments += 1;
        if limit == Limit::End {
            key.bytes.push(END_LIMIT);
        }
        key.limited = limit != Limit::None;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(coltyp: ColumnType) -> SegmentKind {
        SegmentKind {
            coltyp,
            cp: CodePage::UNICODE,
            descending: false,
            nulls_high: false,
        }
    }

    #[test]
    fn signed_integers_sort_numerically() {
        let k = kind(ColumnType::Long);
        let keys: Vec<Vec<u8>> = [-5i32, -1, 0, 3, 1000]
            .iter()
            .map(|v| normalize_segment(k, Some(&v.to_le_bytes()), false))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn doubles_sort_numerically() {
        let k = kind(ColumnType::IEEEDouble);
        let keys: Vec<Vec<u8>> = [-2.5f64, -0.5, 0.0, 0.25, 8.0]
            .iter()
            .map(|v| normalize_segment(k, Some(&v.to_le_bytes()), false))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn text_is_case_insensitive_and_prefix_ordered() {
        let k = SegmentKind {
            cp: CodePage::ASCII,
            ..kind(ColumnType::Text)
        };
        assert_eq!(
            normalize_segment(k, Some(b"Alpha"), false),
            normalize_segment(k, Some(b"alpha"), false)
        );
        assert!(normalize_segment(k, Some(b"a"), false) < normalize_segment(k, Some(b"ab"), false));
        let open = normalize_segment(k, Some(b"al"), true);
        assert!(normalize_segment(k, Some(b"alpha"), false).starts_with(&open));
    }

    #[test]
    fn null_sorts_before_values() {
        let k = kind(ColumnType::Binary);
        assert!(normalize_segment(k, None, false) < normalize_segment(k, Some(&[]), false));
    }

    #[test]
    fn descending_reverses_order() {
        let k = SegmentKind {
            descending: true,
            ..kind(ColumnType::Long)
        };
        let low = normalize_segment(k, Some(&1i32.to_le_bytes()), false);
        let high = normalize_segment(k, Some(&2i32.to_le_bytes()), false);
        assert!(high < low);
    }

    #[test]
    fn make_key_requires_new_key_first() {
        let kinds = [kind(ColumnType::Long)];
        let result = SearchKey::append(None, &kinds, Some(&1i32.to_le_bytes()), MakeKeyGrbit::NONE);
        assert_eq!(result.unwrap_err(), err::KEY_NOT_MADE);
    }

    #[test]
    fn make_key_rejects_extra_segments() {
        let kinds = [kind(ColumnType::Long)];
        let key = SearchKey::append(None, &kinds, Some(&1i32.to_le_bytes()), MakeKeyGrbit::NEW_KEY)
            .unwrap();
        let result = SearchKey::append(
            Some(key),
            &kinds,
            Some(&2i32.to_le_bytes()),
            MakeKeyGrbit::NONE,
        );
        assert_eq!(result.unwrap_err(), err::KEY_IS_MADE);
    }

    #[test]
    fn make_key_checks_fixed_width() {
        let kinds = [kind(ColumnType::Long)];
        let result = SearchKey::append(None, &kinds, Some(&[1, 2]), MakeKeyGrbit::NEW_KEY);
        assert_eq!(result.unwrap_err(), err::INVALID_BUFFER_SIZE);
    }

    proptest::proptest! {
        #[test]
        fn long_long_keys_preserve_order(a: i64, b: i64) {
            let k = kind(ColumnType::LongLong);
            let ka = normalize_segment(k, Some(&a.to_le_bytes()), false);
            let kb = normalize_segment(k, Some(&b.to_le_bytes()), false);
            proptest::prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
        }

        #[test]
        fn binary_keys_preserve_order(
            a in proptest::collection::vec(0u8..4, 0..8),
            b in proptest::collection::vec(0u8..4, 0..8),
        ) {
            let k = kind(ColumnType::Binary);
            let ka = normalize_segment(k, Some(&a), false);
            let kb = normalize_segment(k, Some(&b), false);
            proptest::prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
        }
    }
}
