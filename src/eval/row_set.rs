//! Row-position sets used to narrow vectorized evaluation.

use arrow::array::{BooleanArray, UInt32Array};
use roaring::RoaringBitmap;

/// Position of a row inside the table being evaluated.
pub type RowPos = u32;

/// Positions of a set, smallest first.
pub type RowPosIter<'a> = Box<dyn Iterator<Item = RowPos> + Send + 'a>;

/// Rows of one table that are still candidates for a constraint.
///
/// Positions index the table's record batch, never its row ids, so two sets
/// only combine meaningfully when they come from the same table.
pub trait RowSet: Send + Sync {
    /// Number of positions held.
    fn len(&self) -> usize;

    /// No row is left.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walks the positions in table order.
    fn iter(&self) -> RowPosIter<'_>;

    /// Rows present in both sets; used when a clause of `AND` narrows the
    /// candidates.
    fn intersect(&self, other: &Self) -> Self
    where
        Self: Sized;

    /// Rows present in either set.
    fn union(&self, other: &Self) -> Self
    where
        Self: Sized;

    /// Rows of `self` that `other` lacks, e.g. the candidates a negated
    /// clause did not match.
    fn difference(&self, other: &Self) -> Self
    where
        Self: Sized;
}

/// Candidate rows kept in a roaring bitmap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BitmapRowSet {
    bitmap: RoaringBitmap,
}

impl BitmapRowSet {
    /// No rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every position in `0..len`.
    #[must_use]
    pub fn full(len: RowPos) -> Self {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(0..len);
        Self { bitmap }
    }

    /// Adds the row at `row`.
    pub fn insert(&mut self, row: RowPos) {
        self.bitmap.insert(row);
    }

    /// Whether the row at `row` is a candidate.
    #[must_use]
    pub fn contains(&self, row: RowPos) -> bool {
        self.bitmap.contains(row)
    }

    /// Positions as an Arrow index array, suitable for the `take` kernel.
    #[must_use]
    pub fn to_indices(&self) -> UInt32Array {
        UInt32Array::from_iter_values(self.bitmap.iter())
    }

    /// Dense mask of `len` slots with `true` at every member position.
    #[must_use]
    pub fn to_mask(&self, len: usize) -> BooleanArray {
        let mut slots = vec![false; len];
        for row in self.bitmap.iter() {
            if let Some(slot) = slots.get_mut(row as usize) {
                *slot = true;
            }
        }
        BooleanArray::from(slots)
    }
}

impl FromIterator<RowPos> for BitmapRowSet {
    fn from_iter<I: IntoIterator<Item = RowPos>>(iter: I) -> Self {
        Self {
            bitmap: iter.into_iter().collect(),
        }
    }
}

impl RowSet for BitmapRowSet {
    fn len(&self) -> usize {
        usize::try_from(self.bitmap.len()).unwrap_or(usize::MAX)
    }

    fn iter(&self) -> RowPosIter<'_> {
        Box::new(self.bitmap.iter())
    }

    fn intersect(&self, other: &Self) -> Self {
        let bitmap = &self.bitmap & &other.bitmap;
        Self { bitmap }
    }

    fn union(&self, other: &Self) -> Self {
        let bitmap = &self.bitmap | &other.bitmap;
        Self { bitmap }
    }

    fn difference(&self, other: &Self) -> Self {
        let bitmap = &self.bitmap - &other.bitmap;
        Self { bitmap }
    }
}
