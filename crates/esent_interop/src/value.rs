//! Fixed-width column values.
//!
//! Every scalar the engine stores in a fixed-size column implements
//! [`FixedColumn`]. Values are stored little-endian, matching the engine.

use uuid::Uuid;

/// A value stored in exactly [`SIZE`](FixedColumn::SIZE) bytes.
pub trait FixedColumn: Sized + Copy {
    /// Width of the stored value in bytes.
    const SIZE: usize;

    /// Writes the value into `out`, which is exactly `SIZE` bytes long.
    fn encode(self, out: &mut [u8]);

    /// Reads a value from `bytes`, which is exactly `SIZE` bytes long.
    fn decode(bytes: &[u8]) -> Self;

    /// Returns the stored bytes of the value.
    fn to_bytes(self) -> Vec<u8> {
        let mut out = vec![0; Self::SIZE];
        self.encode(&mut out);
        out
    }
}

macro_rules! fixed_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedColumn for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn encode(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

fixed_le!(u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);

impl FixedColumn for bool {
    const SIZE: usize = 1;

    fn encode(self, out: &mut [u8]) {
        out[0] = if self { 0xFF } else { 0 };
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// GUIDs use the Windows mixed-endian layout.
impl FixedColumn for Uuid {
    const SIZE: usize = 16;

    fn encode(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes_le());
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Uuid::from_bytes_le(raw)
    }
}

/// An OLE automation date: days since 1899-12-30, with the time of day as
/// the fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct OleDateTime(pub f64);

impl OleDateTime {
    /// Days between the OLE epoch and the Unix epoch.
    const UNIX_EPOCH_OFFSET_DAYS: f64 = 25569.0;
    const SECONDS_PER_DAY: f64 = 86400.0;

    /// Converts seconds since the Unix epoch.
    #[must_use]
    pub fn from_unix_seconds(seconds: f64) -> Self {
        Self(seconds / Self::SECONDS_PER_DAY + Self::UNIX_EPOCH_OFFSET_DAYS)
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn to_unix_seconds(self) -> f64 {
        (self.0 - Self::UNIX_EPOCH_OFFSET_DAYS) * Self::SECONDS_PER_DAY
    }
}

impl FixedColumn for OleDateTime {
    const SIZE: usize = 8;

    fn encode(self, out: &mut [u8]) {
        self.0.encode(out);
    }

    fn decode(bytes: &[u8]) -> Self {
        Self(f64::decode(bytes))
    }
}
