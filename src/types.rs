/// Single grid axis, used for row/column indices and board extents.
pub type Idx = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// `(row, col)` coordinates of a cell.
pub type RowCol = (Idx, Idx);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for RowCol {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn area(rows: Idx, cols: Idx) -> CellCount {
    let rows = rows as CellCount;
    let cols = cols as CellCount;
    rows.saturating_mul(cols)
}

/// Iterates the up-to-8 in-bounds neighbors of a cell, row by row.
#[derive(Debug)]
pub struct NeighborIter {
    center: RowCol,
    bounds: RowCol,
    step: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: RowCol, bounds: RowCol) -> Self {
        Self {
            center,
            bounds,
            step: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = RowCol;

    fn next(&mut self) -> Option<Self::Item> {
        while self.step < 9 {
            let (dr, dc) = (i16::from(self.step / 3) - 1, i16::from(self.step % 3) - 1);
            self.step += 1;
            if (dr, dc) == (0, 0) {
                continue;
            }

            let row = i16::from(self.center.0) + dr;
            let col = i16::from(self.center.1) + dc;
            let in_bounds = (0..i16::from(self.bounds.0)).contains(&row)
                && (0..i16::from(self.bounds.1)).contains(&col);
            if in_bounds {
                return Some((row as Idx, col as Idx));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(center: RowCol, bounds: RowCol) -> Vec<RowCol> {
        NeighborIter::new(center, bounds).collect()
    }

    #[test]
    fn center_cell_has_eight_neighbors() {
        let neighbors = collect((1, 1), (3, 3));
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&(1, 1)));
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        assert_eq!(collect((0, 0), (3, 3)), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(collect((2, 2), (3, 3)), vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert!(collect((0, 0), (1, 1)).is_empty());
    }

    #[test]
    fn area_covers_the_full_index_range() {
        assert_eq!(area(255, 255), 65_025);
        assert_eq!(area(3, 3), 9);
    }
}
