//! Stable byte representation of records
//!
//! Records are never compared for equality. Two records are treated as the
//! same record exactly when their key bytes hash to the same filter positions.

use std::borrow::Cow;
use std::ops::Deref;

/// Longest key kept on the stack by [`KeyBytes::inline`]
pub const INLINE_KEY_CAPACITY: usize = 16;

/// Key bytes of one record
///
/// Borrowed when the record already holds its bytes, inline for short keys
/// built on the fly (integers), owned otherwise. Derefs to `[u8]`.
#[derive(Clone, Debug)]
pub enum KeyBytes<'a> {
    Borrowed(&'a [u8]),
    Inline {
        buf: [u8; INLINE_KEY_CAPACITY],
        len: u8,
    },
    Owned(Vec<u8>),
}

impl KeyBytes<'_> {
    /// Copy `bytes` onto the stack, spilling to the heap past
    /// [`INLINE_KEY_CAPACITY`]
    pub fn inline(bytes: &[u8]) -> Self {
        if bytes.len() > INLINE_KEY_CAPACITY {
            return KeyBytes::Owned(bytes.to_vec());
        }
        let mut buf = [0u8; INLINE_KEY_CAPACITY];
        buf[..bytes.len()].copy_from_slice(bytes);
        KeyBytes::Inline {
            buf,
            len: bytes.len() as u8,
        }
    }

    pub fn is_heap_allocated(&self) -> bool {
        matches!(self, KeyBytes::Owned(_))
    }
}

impl Deref for KeyBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            KeyBytes::Borrowed(bytes) => *bytes,
            KeyBytes::Inline { buf, len } => &buf[..*len as usize],
            KeyBytes::Owned(bytes) => bytes.as_slice(),
        }
    }
}

impl AsRef<[u8]> for KeyBytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self.deref()
    }
}

impl PartialEq for KeyBytes<'_> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl Eq for KeyBytes<'_> {}

impl<'a> From<&'a [u8]> for KeyBytes<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        KeyBytes::Borrowed(bytes)
    }
}

impl From<Vec<u8>> for KeyBytes<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        KeyBytes::Owned(bytes)
    }
}

impl<'a> From<Cow<'a, [u8]>> for KeyBytes<'a> {
    fn from(bytes: Cow<'a, [u8]>) -> Self {
        match bytes {
            Cow::Borrowed(bytes) => KeyBytes::Borrowed(bytes),
            Cow::Owned(bytes) => KeyBytes::Owned(bytes),
        }
    }
}

/// A record that can be fed to a membership filter
///
/// Implementations must be deterministic: the same logical record always
/// yields the same bytes within one deduplication pass.
pub trait RecordKey {
    /// Bytes hashed into the filter
    fn key_bytes(&self) -> KeyBytes<'_>;
}

impl<T: RecordKey + ?Sized> RecordKey for &T {
    fn key_bytes(&self) -> KeyBytes<'_> {
        (**self).key_bytes()
    }
}

impl<T: RecordKey + ?Sized> RecordKey for Box<T> {
    fn key_bytes(&self) -> KeyBytes<'_> {
        (**self).key_bytes()
    }
}

impl RecordKey for [u8] {
    fn key_bytes(&self) -> KeyBytes<'_> {
        KeyBytes::Borrowed(self)
    }
}

impl<const N: usize> RecordKey for [u8; N] {
    fn key_bytes(&self) -> KeyBytes<'_> {
        KeyBytes::Borrowed(self.as_slice())
    }
}

impl RecordKey for Vec<u8> {
    fn key_bytes(&self) -> KeyBytes<'_> {
        KeyBytes::Borrowed(self.as_slice())
    }
}

impl RecordKey for str {
    fn key_bytes(&self) -> KeyBytes<'_> {
        KeyBytes::Borrowed(self.as_bytes())
    }
}

impl RecordKey for String {
    fn key_bytes(&self) -> KeyBytes<'_> {
        KeyBytes::Borrowed(self.as_bytes())
    }
}

macro_rules! impl_record_key_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RecordKey for $ty {
                fn key_bytes(&self) -> KeyBytes<'_> {
                    KeyBytes::inline(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_record_key_for_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
