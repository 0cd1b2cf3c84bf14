use std::fmt;

/// Largest logical rank a layout may have.
pub const MAX_NDIMS: usize = 6;

/// Per-axis logical coordinates, valid up to the owning shape's rank.
pub type Coords = [usize; MAX_NDIMS];

/// A logical tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// True if any axis has size zero.
    pub fn is_degenerate(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Splits a row-major linear index into per-axis coordinates.
    ///
    /// The last axis varies fastest. Only the first `ndim()` entries of the
    /// result are meaningful.
    ///
    /// # Panics
    /// Panics if the shape is degenerate or has more than `MAX_NDIMS` axes.
    pub fn unravel(&self, index: usize) -> Coords {
        let mut coords = [0usize; MAX_NDIMS];
        let mut rest = index;
        for (axis, &d) in self.dims.iter().enumerate().rev() {
            coords[axis] = rest % d;
            rest /= d;
        }
        coords
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::from_slice(&dims)
    }
}
