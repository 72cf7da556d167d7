use nalgebra::Point3;
use std::collections::HashMap;

/// Positions of one selection in one frame, paired with its local-to-global index map.
///
/// `positions[i]` belongs to the atom with global index `indices[i]`. Selections may
/// change membership between frames, so the map is stored per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionFrame {
    pub positions: Vec<Point3<f64>>,
    pub indices: Vec<usize>,
}

impl SelectionFrame {
    pub fn new(positions: Vec<Point3<f64>>, indices: Vec<usize>) -> Self {
        Self { positions, indices }
    }

    /// Collects the positions of `indices` from a whole-system coordinate array.
    ///
    /// # Return
    ///
    /// `None` if any index has no position in `all_positions`.
    pub fn gather(indices: Vec<usize>, all_positions: &[Point3<f64>]) -> Option<Self> {
        let positions = indices
            .iter()
            .map(|&idx| all_positions.get(idx).copied())
            .collect::<Option<Vec<_>>>()?;
        Some(Self { positions, indices })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether every local position has exactly one global index.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() == self.indices.len()
    }

    /// Builds the global-to-local lookup for this frame.
    pub fn global_to_local(&self) -> HashMap<usize, usize> {
        self.indices
            .iter()
            .enumerate()
            .map(|(local, &global)| (global, local))
            .collect()
    }
}

/// The per-frame payload handed to the detection workers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameData {
    pub first: SelectionFrame,
    pub second: SelectionFrame,
}

impl FrameData {
    pub fn new(first: SelectionFrame, second: SelectionFrame) -> Self {
        Self { first, second }
    }
}
