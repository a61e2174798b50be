/// A 2D grid stored row-major in one contiguous buffer (no wrapping).
///
/// Index of `(row, col)` is `row * cols + col`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` if the length
    /// does not match `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    #[inline]
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[self.index(row, col)]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = self.index(row, col);
        &mut self.data[idx]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    /// Value at a signed offset, or `None` when it falls outside the grid.
    pub fn get_checked(&self, row: isize, col: isize) -> Option<&T> {
        if self.in_bounds(row, col) {
            Some(self.get(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Row slice.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx / cols, idx % cols, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let cols = self.cols;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            (idx / cols, idx % cols, val)
        })
    }

    /// Copy a `rows x cols` window starting at `(origin_row, origin_col)`
    /// into a new grid.
    pub fn window(&self, origin_row: usize, origin_col: usize, rows: usize, cols: usize) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let start = self.index(origin_row + r, origin_col);
            data.extend_from_slice(&self.data[start..start + cols]);
        }
        Self { rows, cols, data }
    }
}

impl Grid<f32> {
    /// (min, max) over all cells.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        (min_h, max_h)
    }
}
