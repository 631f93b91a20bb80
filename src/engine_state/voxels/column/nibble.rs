//! # Nibble Array
//!
//! Packed storage for 4-bit light levels, two per byte. The cell with an even index
//! lives in the low nibble of its byte and the following odd index in the high nibble,
//! which is the layout used by the column save format.

/// Largest value a nibble can hold.
pub const MAX_NIBBLE: u8 = 0x0F;

/// A fixed-length array of 4-bit values backed by `len / 2` bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct NibbleArray {
    bytes: Box<[u8]>,
}

impl NibbleArray {
    /// Creates an array of `cells` zeroed nibbles.
    ///
    /// `cells` is rounded up to an even count.
    pub fn zeroed(cells: usize) -> Self {
        Self {
            bytes: vec![0; cells.div_ceil(2)].into_boxed_slice(),
        }
    }

    /// Creates an array of `cells` nibbles that all hold `value`.
    pub fn filled(cells: usize, value: u8) -> Self {
        let value = value & MAX_NIBBLE;
        Self {
            bytes: vec![value | (value << 4); cells.div_ceil(2)].into_boxed_slice(),
        }
    }

    /// Wraps already-packed bytes, as stored on disk.
    pub fn from_packed(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Number of nibbles.
    pub fn len(&self) -> usize {
        self.bytes.len() * 2
    }

    /// Returns `true` if the array holds no nibbles.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The packed backing bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads the nibble at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        let byte = self.bytes[index >> 1];
        if index & 1 == 0 {
            byte & MAX_NIBBLE
        } else {
            byte >> 4
        }
    }

    /// Writes the nibble at `index`, leaving its sibling nibble untouched.
    ///
    /// Values above 15 are truncated to their low four bits.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        let value = value & MAX_NIBBLE;
        let byte = &mut self.bytes[index >> 1];
        *byte = if index & 1 == 0 {
            (*byte & 0xF0) | value
        } else {
            (*byte & MAX_NIBBLE) | (value << 4)
        };
    }
}

impl std::fmt::Debug for NibbleArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NibbleArray").field("len", &self.len()).finish()
    }
}
