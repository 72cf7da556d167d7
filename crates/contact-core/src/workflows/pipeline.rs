use crate::analysis::error::PipelineError;
use crate::analysis::filter::{Filter, FrameWindow};
use crate::analysis::sort::Sorting;
use crate::analysis::weight::{WeightFunction, WeightKernel};
use crate::core::models::contact::Contact;
use tracing::{info, instrument};

pub fn filter(contacts: Vec<Contact>, filter: &Filter) -> Vec<Contact> {
    filter.apply(contacts)
}

pub fn restrict_frames(mut contacts: Vec<Contact>, window: &FrameWindow) -> Vec<Contact> {
    window.apply(&mut contacts);
    contacts
}

pub fn reweight(
    mut contacts: Vec<Contact>,
    function: &WeightFunction,
) -> Result<Vec<Contact>, PipelineError> {
    function.apply(&mut contacts)?;
    Ok(contacts)
}

pub fn sort(contacts: Vec<Contact>, sorting: &Sorting) -> Result<Vec<Contact>, PipelineError> {
    sorting.sort(contacts)
}

/// One post-processing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStep {
    Filter(Filter),
    FrameWindow(FrameWindow),
    /// Reweights with a function bound to an explicit domain.
    Reweight(WeightFunction),
    /// Reweights with a kernel evaluated over the frame axis of the contacts at the
    /// time the step runs, so it follows any preceding frame window.
    ReweightFrames(WeightKernel),
    Sort(Sorting),
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter(Filter::ResidueName { .. }) => "residue name filter",
            Self::Filter(Filter::ResidueRange { .. }) => "residue range filter",
            Self::Filter(Filter::Threshold { .. }) => "threshold filter",
            Self::FrameWindow(_) => "frame window",
            Self::Reweight(_) | Self::ReweightFrames(_) => "weight function",
            Self::Sort(_) => "sort",
        }
    }

    pub fn apply(&self, contacts: Vec<Contact>) -> Result<Vec<Contact>, PipelineError> {
        match self {
            Self::Filter(f) => Ok(filter(contacts, f)),
            Self::FrameWindow(window) => Ok(restrict_frames(contacts, window)),
            Self::Reweight(function) => reweight(contacts, function),
            Self::ReweightFrames(kernel) => {
                let frame_count = contacts.first().map_or(0, Contact::frame_count);
                reweight(contacts, &WeightFunction::over_frames(frame_count, *kernel))
            }
            Self::Sort(sorting) => sort(contacts, sorting),
        }
    }
}

/// An ordered list of post-processing steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order. The first failing step aborts the run.
    #[instrument(skip_all, name = "pipeline", fields(steps = self.steps.len()))]
    pub fn run(&self, mut contacts: Vec<Contact>) -> Result<Vec<Contact>, PipelineError> {
        for (index, step) in self.steps.iter().enumerate() {
            let before = contacts.len();
            contacts = step.apply(contacts)?;
            info!(
                step = index,
                kind = step.name(),
                before,
                after = contacts.len(),
                "Pipeline step applied."
            );
        }
        Ok(contacts)
    }
}

impl FromIterator<PipelineStep> for Pipeline {
    fn from_iter<I: IntoIterator<Item = PipelineStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
