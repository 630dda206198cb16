//! Index element types and type-erased index views.
//!
//! Index data is stored as raw bytes plus an [`IndexFormat`] tag. Code that
//! needs typed access is written once, generic over [`IndexElement`], and the
//! format tag is matched at the boundary.

use std::fmt;

use super::data::IndexFormat;

/// An unsigned integer type usable as a mesh index.
pub trait IndexElement:
    bytemuck::Pod + Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static
{
    /// Matching index format.
    const FORMAT: IndexFormat;

    /// Widen to `u32`.
    fn to_u32(self) -> u32;

    /// Narrow from `u32`, or `None` if the value doesn't fit.
    fn from_u32(value: u32) -> Option<Self>;
}

macro_rules! impl_index_element {
    ($ty:ty, $format:expr) => {
        impl IndexElement for $ty {
            const FORMAT: IndexFormat = $format;

            #[inline]
            fn to_u32(self) -> u32 {
                self as u32
            }

            #[inline]
            fn from_u32(value: u32) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }
        }
    };
}

impl_index_element!(u8, IndexFormat::Uint8);
impl_index_element!(u16, IndexFormat::Uint16);
impl_index_element!(u32, IndexFormat::Uint32);

/// Read-only view of tightly packed indices of any [`IndexFormat`].
///
/// The bytes need no particular alignment; values are read in native byte
/// order, matching what `bytemuck` casts produce.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IndicesRef<'a> {
    format: IndexFormat,
    data: &'a [u8],
}

impl<'a> IndicesRef<'a> {
    /// Wrap raw index bytes.
    ///
    /// # Panics
    ///
    /// If the byte length isn't a multiple of the format size.
    pub fn new(format: IndexFormat, data: &'a [u8]) -> Self {
        assert!(
            data.len() % format.size() == 0,
            "IndicesRef::new(): {} bytes is not a whole number of {:?} indices",
            data.len(),
            format
        );
        Self { format, data }
    }

    /// View a typed index slice.
    pub fn from_slice<T: IndexElement>(indices: &'a [T]) -> Self {
        Self {
            format: T::FORMAT,
            data: bytemuck::cast_slice(indices),
        }
    }

    /// Element format.
    pub fn format(&self) -> IndexFormat {
        self.format
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.data.len() / self.format.size()
    }

    /// Whether there are no indices.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index at position `i`.
    #[inline]
    pub fn get(&self, i: usize) -> u32 {
        match self.format {
            IndexFormat::Uint8 => self.data[i] as u32,
            IndexFormat::Uint16 => {
                bytemuck::pod_read_unaligned::<u16>(&self.data[i * 2..i * 2 + 2]) as u32
            }
            IndexFormat::Uint32 => bytemuck::pod_read_unaligned::<u32>(&self.data[i * 4..i * 4 + 4]),
        }
    }

    /// Iterate over the indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        let copy = *self;
        (0..self.len()).map(move |i| copy.get(i))
    }

    /// Copy all indices into a `u32` vector.
    pub fn to_u32_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Smallest and largest index, or `None` if empty.
    pub fn min_max(&self) -> Option<(u32, u32)> {
        self.iter().fold(None, |acc, index| match acc {
            None => Some((index, index)),
            Some((min, max)) => Some((min.min(index), max.max(index))),
        })
    }
}

impl fmt::Debug for IndicesRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicesRef")
            .field("format", &self.format)
            .field("indices", &self.to_u32_vec())
            .finish()
    }
}

impl<'a, T: IndexElement> From<&'a [T]> for IndicesRef<'a> {
    fn from(indices: &'a [T]) -> Self {
        Self::from_slice(indices)
    }
}

impl<'a, T: IndexElement, const N: usize> From<&'a [T; N]> for IndicesRef<'a> {
    fn from(indices: &'a [T; N]) -> Self {
        Self::from_slice(&indices[..])
    }
}
