use super::chunker::FrameChunk;
use super::config::{ConfigError, KernelParams};
use super::error::{EngineError, KernelError};
use super::progress::{Progress, ProgressReporter};
use super::worker::process_chunk;
use crate::core::models::atom_contact::AtomContact;
use crate::core::models::frame::FrameData;
use crate::core::models::topology::Topology;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type ChunkOutcome = Result<Vec<Vec<AtomContact>>, KernelError>;

/// Distributes frame chunks over a fixed-size worker pool and merges the results.
pub struct ParallelCoordinator {
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl ParallelCoordinator {
    /// Creates a coordinator with a dedicated pool of exactly `workers` threads.
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "workers",
                reason: "at least one worker is required".to_string(),
            }
            .into());
        }

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("contact-worker-{i}"))
            .build()
            .map_err(|e| {
                EngineError::Initialization(format!("Failed to build worker pool: {e}"))
            })?;

        Ok(Self {
            workers,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Detects the contacts of every frame.
    ///
    /// Frames are split into one contiguous chunk per worker. The per-chunk results are
    /// concatenated in chunk order, so entry `f` of the returned list holds the contacts
    /// of frame `f`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyTrajectory`] for zero frames, [`EngineError::EmptySelection`]
    /// if one side selects no atom in any frame, and [`EngineError::Worker`] carrying the
    /// failure of the lowest-numbered failing chunk. No partial result is produced.
    #[instrument(skip_all, name = "contact_detection", fields(frames = frames.len(), workers = self.workers))]
    pub fn run(
        &self,
        frames: Vec<FrameData>,
        topology: Arc<Topology>,
        params: KernelParams,
        reporter: &ProgressReporter,
    ) -> Result<Vec<Vec<AtomContact>>, EngineError> {
        if frames.is_empty() {
            return Err(EngineError::EmptyTrajectory);
        }
        if frames.iter().all(|f| f.first.is_empty()) {
            return Err(EngineError::EmptySelection {
                side: 1,
                expression: None,
            });
        }
        if frames.iter().all(|f| f.second.is_empty()) {
            return Err(EngineError::EmptySelection {
                side: 2,
                expression: None,
            });
        }

        let frame_count = frames.len();
        let chunks = FrameChunk::partition(frames, self.workers)?;
        info!(
            frames = frame_count,
            chunks = chunks.len(),
            "Dispatching frame chunks to workers."
        );
        reporter.report(Progress::TaskStart {
            total_steps: chunks.len() as u64,
        });

        let run_chunk = |chunk: &FrameChunk| -> ChunkOutcome {
            let outcome = process_chunk(chunk, &topology, &params);
            reporter.report(Progress::TaskIncrement);
            outcome
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<ChunkOutcome> = self
            .pool
            .install(|| chunks.par_iter().map(run_chunk).collect());

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<ChunkOutcome> = chunks.iter().map(run_chunk).collect();

        reporter.report(Progress::TaskFinish);

        let mut merged = Vec::with_capacity(frame_count);
        for (chunk, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(frames) => merged.extend(frames),
                Err(source) => {
                    warn!(chunk, error = %source, "Worker failed; discarding all results.");
                    return Err(EngineError::Worker { chunk, source });
                }
            }
        }
        if merged.len() != frame_count {
            return Err(EngineError::Internal(format!(
                "Merged {} frame results for {} frames",
                merged.len(),
                frame_count
            )));
        }

        info!(
            contacts = merged.iter().map(Vec::len).sum::<usize>(),
            "Contact detection complete."
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::frame::SelectionFrame;
    use crate::core::models::topology::{AtomRecord, TopologyBuilder};
    use crate::engine::kernel::detect_frame_contacts;
    use nalgebra::Point3;
    use std::sync::Mutex;

    fn params() -> KernelParams {
        KernelParams {
            cutoff: 5.0,
            hbond_cutoff: 2.5,
            hbond_angle: 120.0,
            self_interaction: false,
        }
    }

    /// Two polar residues with a hydroxyl hydrogen, drifting apart frame by frame.
    fn drifting_system(frame_count: usize) -> (Arc<Topology>, Vec<FrameData>) {
        let mut builder = TopologyBuilder::new();
        builder.add_atom(AtomRecord::new("OG", 1, "SER", "A"));
        builder.add_atom(AtomRecord::new("HG1", 1, "SER", "A"));
        builder.add_atom(AtomRecord::new("CB", 1, "SER", "A"));
        builder.add_atom(AtomRecord::new("O", 30, "GLY", "B"));
        builder.add_atom(AtomRecord::new("CA", 30, "GLY", "B"));
        builder.add_bond(0, 1).add_bond(0, 2);
        let topology = Arc::new(builder.build().unwrap());

        let frames = (0..frame_count)
            .map(|f| {
                let shift = 0.4 * f as f64;
                let all = [
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(0.96, 0.0, 0.0),
                    Point3::new(-1.4, 0.5, 0.0),
                    Point3::new(2.8 + shift, 0.0, 0.0),
                    Point3::new(3.9 + shift, 0.8, 0.0),
                ];
                FrameData::new(
                    SelectionFrame::gather(vec![0, 1, 2], &all).unwrap(),
                    SelectionFrame::gather(vec![3, 4], &all).unwrap(),
                )
            })
            .collect();
        (topology, frames)
    }

    #[test]
    fn results_are_independent_of_worker_count() {
        let (topology, frames) = drifting_system(13);
        let sequential: Vec<_> = frames
            .iter()
            .enumerate()
            .map(|(f, frame)| detect_frame_contacts(f, frame, &topology, &params()).unwrap())
            .collect();
        assert!(sequential.iter().any(|c| c.iter().any(|ac| !ac.hydrogen_bonds().is_empty())));

        for workers in [1, 2, 4, 7] {
            let coordinator = ParallelCoordinator::new(workers).unwrap();
            let merged = coordinator
                .run(
                    frames.clone(),
                    Arc::clone(&topology),
                    params(),
                    &ProgressReporter::new(),
                )
                .unwrap();
            assert_eq!(merged, sequential, "workers = {workers}");
            for (f, contacts) in merged.iter().enumerate() {
                assert!(contacts.iter().all(|ac| ac.frame() == f));
            }
        }
    }

    #[test]
    fn more_workers_than_frames_is_tolerated() {
        let (topology, frames) = drifting_system(2);
        let merged = ParallelCoordinator::new(7)
            .unwrap()
            .run(frames, topology, params(), &ProgressReporter::new())
            .unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn lowest_failing_chunk_is_reported() {
        let (topology, mut frames) = drifting_system(8);
        for bad in [3, 6] {
            frames[bad].second = SelectionFrame::new(vec![Point3::origin()], vec![99]);
        }
        let result = ParallelCoordinator::new(4)
            .unwrap()
            .run(frames, topology, params(), &ProgressReporter::new());

        match result {
            Err(EngineError::Worker { chunk, source }) => {
                assert_eq!(chunk, 1);
                assert_eq!(
                    source,
                    KernelError::AtomOutOfRange {
                        frame: 3,
                        index: 99,
                        len: 5
                    }
                );
            }
            other => panic!("expected worker failure, got {other:?}"),
        }
    }

    #[test]
    fn empty_inputs_are_rejected_before_dispatch() {
        let coordinator = ParallelCoordinator::new(2).unwrap();
        let (topology, mut frames) = drifting_system(3);

        assert!(matches!(
            coordinator.run(Vec::new(), Arc::clone(&topology), params(), &ProgressReporter::new()),
            Err(EngineError::EmptyTrajectory)
        ));

        for frame in &mut frames {
            frame.second = SelectionFrame::default();
        }
        assert!(matches!(
            coordinator.run(frames, topology, params(), &ProgressReporter::new()),
            Err(EngineError::EmptySelection { side: 2, .. })
        ));
    }

    #[test]
    fn zero_workers_is_a_configuration_error() {
        assert!(matches!(
            ParallelCoordinator::new(0),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn progress_is_reported_once_per_chunk() {
        let (topology, frames) = drifting_system(5);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        ParallelCoordinator::new(3)
            .unwrap()
            .run(frames, topology, params(), &reporter)
            .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(events.first(), Some(&Progress::TaskStart { total_steps: 3 }));
        assert_eq!(events.last(), Some(&Progress::TaskFinish));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == Progress::TaskIncrement)
                .count(),
            3
        );
    }
}
