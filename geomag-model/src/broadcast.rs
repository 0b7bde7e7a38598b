//! Scalar-or-vector inputs and the broadcasting rule that combines them.
//!
//! Every batched input has a length. Inputs of length 1 stand for any length; all other lengths
//! must agree. The batch length is that common length, or 1 if every input is a scalar.
//!
//! ```
//! use geomag_model::broadcast::{broadcast_len, Samples};
//!
//! let lat = Samples::from(45.0);
//! let alt = Samples::from(vec![0.0, 10.0, 20.0]);
//! assert_eq!(broadcast_len(&[("latitude", lat.len()), ("altitude", alt.len())])?, 3);
//! assert_eq!(*lat.at(2), 45.0);
//! # Ok::<(), geomag_core::GeomagError>(())
//! ```

use geomag_core::{GeomagError, GeomagResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common length of inputs with the given `(name, length)` pairs.
///
/// # Errors
///
/// [`GeomagError::ShapeMismatch`] naming every input when two lengths other than 1 differ.
pub fn broadcast_len(sizes: &[(&str, usize)]) -> GeomagResult<usize> {
    let mut len = 1;
    for &(_, size) in sizes {
        if size == 1 || size == len {
            continue;
        }
        if len == 1 {
            len = size;
        } else {
            return Err(GeomagError::shape_mismatch(sizes));
        }
    }
    Ok(len)
}

/// Index into an input of length `len` for element `i` of the broadcast batch.
#[inline]
pub fn broadcast_index(len: usize, i: usize) -> usize {
    if len == 1 {
        0
    } else {
        i
    }
}

/// One value or a batch of values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Samples<T>(Vec<T>);

impl<T> Samples<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self(values)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.0.len() == 1
    }

    /// Element `i` of the broadcast batch.
    ///
    /// # Panics
    ///
    /// If `i` is out of range for a non-scalar input.
    #[inline]
    pub fn at(&self, i: usize) -> &T {
        &self.0[broadcast_index(self.0.len(), i)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Samples<U> {
        Samples(self.0.iter().map(f).collect())
    }

    /// Expands to `len` values, repeating a scalar.
    pub fn broadcast_to(&self, len: usize) -> GeomagResult<Vec<T>>
    where
        T: Clone,
    {
        match self.0.len() {
            1 => Ok(vec![self.0[0].clone(); len]),
            n if n == len => Ok(self.0.clone()),
            n => Err(GeomagError::shape_mismatch(&[("input", n), ("target", len)])),
        }
    }
}

macro_rules! impl_scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Samples<$t> {
                fn from(value: $t) -> Self {
                    Self(vec![value])
                }
            }
        )*
    };
}

impl_scalar_from!(f64, i32, u32);

impl<T> From<Vec<T>> for Samples<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T: Clone> From<&[T]> for Samples<T> {
    fn from(values: &[T]) -> Self {
        Self(values.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for Samples<T> {
    fn from(values: [T; N]) -> Self {
        Self(values.into())
    }
}

impl<'a, T> IntoIterator for &'a Samples<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
