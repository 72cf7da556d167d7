use crate::core::io::traits::{TrajectoryError, TrajectoryProvider};
use crate::core::models::atom_contact::AtomContact;
use crate::core::models::contact::Contact;
use crate::core::models::frame::{FrameData, SelectionFrame};
use crate::core::models::topology::Topology;
use crate::core::selection::Selection;
use crate::engine::aggregator;
use crate::engine::config::DetectionConfig;
use crate::engine::coordinator::ParallelCoordinator;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Point3;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Frame-ordered output of a detection run.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Entry `f` holds the atom contacts observed in frame `f`.
    pub frames: Vec<Vec<AtomContact>>,
    pub topology: Arc<Topology>,
    pub self_interaction: bool,
}

impl DetectionResult {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn atom_contact_count(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    /// Collapses the per-frame observations into one [`Contact`] per atom pair.
    pub fn aggregate(&self) -> Result<Vec<Contact>, EngineError> {
        aggregator::aggregate(&self.frames, &self.topology)
    }
}

/// Resolves one selection per frame, reusing the first result when the selection does
/// not depend on positions.
struct SelectionResolver {
    selection: Selection,
    side: usize,
    resolved: Option<Vec<usize>>,
}

impl SelectionResolver {
    fn new(selection: Selection, side: usize) -> Self {
        Self {
            selection,
            side,
            resolved: None,
        }
    }

    fn indices(
        &mut self,
        topology: &Topology,
        positions: &[Point3<f64>],
    ) -> Result<Vec<usize>, EngineError> {
        if let Some(indices) = &self.resolved {
            return Ok(indices.clone());
        }
        let indices = self.selection.evaluate(topology, positions)?;
        if !self.selection.is_dynamic() {
            debug!(
                side = self.side,
                atoms = indices.len(),
                "Static selection resolved once for all frames."
            );
            self.resolved = Some(indices.clone());
        }
        Ok(indices)
    }

    fn gather(
        &mut self,
        frame: usize,
        topology: &Topology,
        positions: &[Point3<f64>],
    ) -> Result<SelectionFrame, EngineError> {
        let indices = self.indices(topology, positions)?;
        SelectionFrame::gather(indices, positions).ok_or_else(|| {
            EngineError::Provider(Box::new(TrajectoryError::AtomCountMismatch {
                frame,
                expected: topology.len(),
                found: positions.len(),
            }))
        })
    }

    fn empty_error(&self) -> EngineError {
        EngineError::EmptySelection {
            side: self.side,
            expression: Some(self.selection.expression().to_string()),
        }
    }
}

/// Detects the contacts between two selections in every frame of a trajectory.
///
/// A second selection equal to `"self"` analyzes the first selection against itself.
/// Selections using `around` are re-evaluated in every frame; all others are resolved
/// once.
///
/// # Errors
///
/// Returns [`EngineError::EmptyTrajectory`] for a trajectory without frames,
/// [`EngineError::EmptySelection`] if a selection matches no atom in the first frame,
/// [`EngineError::Provider`] if frame coordinates cannot be read, and any failure of
/// the worker pool.
#[instrument(skip_all, name = "detection_workflow")]
pub fn run<P: TrajectoryProvider>(
    provider: &P,
    config: &DetectionConfig,
    reporter: &ProgressReporter,
) -> Result<DetectionResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Resolving Selections",
    });
    let self_interaction = config.is_self_interaction();
    let selection_1 = Selection::parse(&config.selection_1)?;
    let selection_2 = if self_interaction {
        selection_1.clone()
    } else {
        Selection::parse(&config.selection_2)?
    };
    info!(
        selection_1 = %selection_1,
        selection_2 = %selection_2,
        self_interaction,
        "Selections parsed."
    );

    let frame_count = provider.frame_count();
    if frame_count == 0 {
        return Err(EngineError::EmptyTrajectory);
    }
    let topology = provider.topology();
    let frames = collect_frames(provider, &topology, selection_1, selection_2)?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Detecting Contacts",
    });
    let coordinator = ParallelCoordinator::new(config.workers)?;
    let frames = coordinator.run(
        frames,
        Arc::clone(&topology),
        config.kernel_params(),
        reporter,
    )?;
    reporter.report(Progress::PhaseFinish);

    let result = DetectionResult {
        frames,
        topology,
        self_interaction,
    };
    info!(
        frames = result.frame_count(),
        atom_contacts = result.atom_contact_count(),
        "Detection workflow complete."
    );
    Ok(result)
}

fn collect_frames<P: TrajectoryProvider>(
    provider: &P,
    topology: &Topology,
    selection_1: Selection,
    selection_2: Selection,
) -> Result<Vec<FrameData>, EngineError> {
    let mut first = SelectionResolver::new(selection_1, 1);
    let mut second = SelectionResolver::new(selection_2, 2);
    let frame_count = provider.frame_count();
    let mut frames = Vec::with_capacity(frame_count);

    for frame in 0..frame_count {
        let positions = provider
            .positions(frame)
            .map_err(|e| EngineError::Provider(Box::new(e)))?;
        let data = FrameData::new(
            first.gather(frame, topology, positions)?,
            second.gather(frame, topology, positions)?,
        );
        if frame == 0 {
            if data.first.is_empty() {
                return Err(first.empty_error());
            }
            if data.second.is_empty() {
                return Err(second.empty_error());
            }
            info!(
                atoms_1 = data.first.len(),
                atoms_2 = data.second.len(),
                "Selections resolved on the first frame."
            );
        }
        frames.push(data);
    }
    Ok(frames)
}
