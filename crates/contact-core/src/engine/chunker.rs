use super::config::ConfigError;
use crate::core::models::frame::FrameData;

/// Splits `items` into exactly `parts` ordered, contiguous sublists.
///
/// Sublist `k` covers `[floor(k * len / parts), floor((k + 1) * len / parts))`, so sizes
/// differ by at most one and concatenating the sublists restores the input. When
/// `parts > len` some sublists are empty.
pub fn split_even<T>(items: Vec<T>, parts: usize) -> Result<Vec<Vec<T>>, ConfigError> {
    if parts == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "workers",
            reason: "cannot split work into zero parts".to_string(),
        });
    }
    let len = items.len();
    let mut iter = items.into_iter();
    Ok((0..parts)
        .map(|k| {
            let size = (k + 1) * len / parts - k * len / parts;
            iter.by_ref().take(size).collect()
        })
        .collect())
}

/// A contiguous run of frames assigned to one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameChunk {
    /// Position of the chunk in the partition; failures are reported by this index.
    pub index: usize,
    /// Trajectory frame id of `frames[0]`.
    pub first_frame: usize,
    pub frames: Vec<FrameData>,
}

impl FrameChunk {
    /// Partitions a trajectory's frame payloads into one chunk per worker.
    pub fn partition(frames: Vec<FrameData>, workers: usize) -> Result<Vec<Self>, ConfigError> {
        let mut first_frame = 0;
        Ok(split_even(frames, workers)?
            .into_iter()
            .enumerate()
            .map(|(index, frames)| {
                let chunk = Self {
                    index,
                    first_frame,
                    frames,
                };
                first_frame += chunk.frames.len();
                chunk
            })
            .collect())
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes_differ_by_at_most_one() {
        let parts = split_even((0..10).collect::<Vec<_>>(), 3).unwrap();
        let sizes: Vec<_> = parts.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 4]);
        assert_eq!(parts.concat(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn split_yields_exactly_the_requested_number_of_parts() {
        for len in [0, 1, 5, 16, 17] {
            for parts in 1..=8 {
                let split = split_even((0..len).collect::<Vec<_>>(), parts).unwrap();
                assert_eq!(split.len(), parts);
                assert_eq!(split.concat(), (0..len).collect::<Vec<_>>());
                let min = split.iter().map(Vec::len).min().unwrap();
                let max = split.iter().map(Vec::len).max().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn more_parts_than_items_leaves_empty_parts() {
        let split = split_even(vec!['a', 'b'], 4).unwrap();
        assert_eq!(split, vec![vec![], vec!['a'], vec![], vec!['b']]);
    }

    #[test]
    fn zero_parts_is_a_configuration_error() {
        assert!(matches!(
            split_even(vec![1, 2, 3], 0),
            Err(ConfigError::InvalidParameter { name: "workers", .. })
        ));
    }

    #[test]
    fn partition_tracks_global_frame_offsets() {
        let chunks = FrameChunk::partition(vec![FrameData::default(); 7], 3).unwrap();
        let layout: Vec<_> = chunks
            .iter()
            .map(|c| (c.index, c.first_frame, c.frames.len()))
            .collect();
        assert_eq!(layout, vec![(0, 0, 2), (1, 2, 2), (2, 4, 3)]);
    }
}
