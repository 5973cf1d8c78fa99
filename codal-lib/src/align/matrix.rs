use serde::Serialize;

/// The three interacting subproblems of the affine-gap recurrence: the
/// on-diagonal plane, the query-longer plane and the reference-longer plane.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum ScoreType {
    General,
    Ins,
    Del,
}

pub const SCORE_TYPE_COUNT: usize = 3;

impl ScoreType {
    fn index(self) -> usize {
        match self {
            ScoreType::General => 0,
            ScoreType::Ins => 1,
            ScoreType::Del => 2,
        }
    }

    fn from_index(index: usize) -> ScoreType {
        match index {
            0 => ScoreType::General,
            1 => ScoreType::Ins,
            2 => ScoreType::Del,
            _ => panic!("matrix index decodes to unknown plane {index}"),
        }
    }
}

/// The dense score-and-predecessor store for all three planes.
///
/// Each cell is a `(score, prev)` pair held at adjacent even/odd offsets of
/// one flat buffer, where `prev` is the flat index of the predecessor cell
/// (possibly in a different plane) or `-1` for a cell the sweep has not
/// written. Storing predecessors as raw indices keeps the traceback a plain
/// pointer chase; [`ScoreMatrix::decode`] must stay the exact inverse of
/// [`ScoreMatrix::index`].
#[derive(Clone, Debug)]
pub struct ScoreMatrix {
    n_len: usize,
    a_len: usize,
    cells: Vec<i32>,
}

impl ScoreMatrix {
    pub fn new(n_len: usize, a_len: usize) -> Self {
        let len = SCORE_TYPE_COUNT * (n_len + 1) * (a_len + 1) * 2;
        let mut cells = vec![0i32; len];
        for cell in cells.chunks_exact_mut(2) {
            cell[1] = -1;
        }
        ScoreMatrix {
            n_len,
            a_len,
            cells,
        }
    }

    /// Flat index of the cell for `score_type` at `(pos_n, pos_a)`.
    #[inline]
    pub fn index(&self, score_type: ScoreType, pos_n: usize, pos_a: usize) -> usize {
        debug_assert!(pos_n <= self.n_len);
        debug_assert!(pos_a <= self.a_len);
        2 * ((self.a_len + 1) * (pos_n + score_type.index() * (self.n_len + 1)) + pos_a)
    }

    /// Inverts [`ScoreMatrix::index`]; used only by the traceback.
    pub fn decode(&self, index: usize) -> (ScoreType, usize, usize) {
        let cell = index / 2;
        let pos_a = cell % (self.a_len + 1);
        let n_total = cell / (self.a_len + 1);
        let pos_n = n_total % (self.n_len + 1);
        (ScoreType::from_index(n_total / (self.n_len + 1)), pos_n, pos_a)
    }

    #[inline]
    pub fn set(&mut self, score_type: ScoreType, pos_n: usize, pos_a: usize, score: i32, prev: i32) {
        let index = self.index(score_type, pos_n, pos_a);
        self.cells[index] = score;
        self.cells[index + 1] = prev;
    }

    /// The `(score, prev)` pair at a flat index.
    #[inline]
    pub fn get(&self, index: usize) -> (i32, i32) {
        (self.cells[index], self.cells[index + 1])
    }

    /// Length of one plane of the flat buffer, in buffer slots.
    pub fn plane_len(&self) -> usize {
        (self.n_len + 1) * (self.a_len + 1) * 2
    }

    /// `(written, total)` cell counts, for coverage diagnostics.
    pub fn filled_cells(&self) -> (usize, usize) {
        let written = self
            .cells
            .chunks_exact(2)
            .filter(|cell| cell[1] != -1)
            .count();
        (written, self.cells.len() / 2)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ScoreMatrix, ScoreType};

    #[rstest]
    fn test_index_decode_round_trip() {
        let matrix = ScoreMatrix::new(5, 3);
        for score_type in [ScoreType::General, ScoreType::Ins, ScoreType::Del] {
            for pos_n in 0..=5 {
                for pos_a in 0..=3 {
                    let index = matrix.index(score_type, pos_n, pos_a);
                    assert_eq!(matrix.decode(index), (score_type, pos_n, pos_a));
                }
            }
        }
    }

    #[rstest]
    fn test_unwritten_cells_have_sentinel_predecessor() {
        let matrix = ScoreMatrix::new(2, 2);
        let index = matrix.index(ScoreType::Del, 1, 1);
        assert_eq!(matrix.get(index), (0, -1));
        assert_eq!(matrix.filled_cells(), (0, 27));
    }

    #[rstest]
    fn test_set_then_get() {
        let mut matrix = ScoreMatrix::new(2, 2);
        let prev = matrix.index(ScoreType::General, 0, 0) as i32;
        matrix.set(ScoreType::Ins, 2, 1, -7, prev);
        let index = matrix.index(ScoreType::Ins, 2, 1);
        assert_eq!(matrix.get(index), (-7, prev));
        assert_eq!(matrix.filled_cells().0, 1);
    }
}
