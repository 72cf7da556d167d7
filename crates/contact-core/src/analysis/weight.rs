use super::error::PipelineError;
use crate::core::models::contact::Contact;
use tracing::debug;

/// Parametrized shape of a weight profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightKernel {
    /// `y = l / (1 + exp(-k (x - x0))) + y0`
    Sigmoid { x0: f64, l: f64, k: f64, y0: f64 },
    /// `y0` everywhere except the index window `[x0, x1)`, which is set to `h`.
    Rectangular { x0: usize, x1: usize, h: f64, y0: f64 },
    /// Affine ramp from `f0` at `x = 0` to `f1` at the last domain value.
    Linear { f0: f64, f1: f64 },
}

impl WeightKernel {
    /// Evaluates the kernel at every point of `domain`.
    pub fn evaluate(&self, domain: &[f64]) -> Vec<f64> {
        match *self {
            Self::Sigmoid { x0, l, k, y0 } => domain
                .iter()
                .map(|&x| l / (1.0 + (-k * (x - x0)).exp()) + y0)
                .collect(),
            Self::Rectangular { x0, x1, h, y0 } => {
                let mut profile = vec![y0; domain.len()];
                let end = x1.min(profile.len());
                let start = x0.min(end);
                profile[start..end].fill(h);
                profile
            }
            Self::Linear { f0, f1 } => {
                let slope = match domain.last() {
                    Some(&last) if last != 0.0 => (f1 - f0) / last,
                    _ => 0.0,
                };
                domain.iter().map(|&x| slope * x + f0).collect()
            }
        }
    }
}

/// A weight kernel bound to the domain it is evaluated on.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFunction {
    domain: Vec<f64>,
    kernel: WeightKernel,
}

impl WeightFunction {
    pub fn new(domain: Vec<f64>, kernel: WeightKernel) -> Self {
        Self { domain, kernel }
    }

    /// A weight function over the frame axis `0, 1, ..., frame_count - 1`.
    pub fn over_frames(frame_count: usize, kernel: WeightKernel) -> Self {
        Self::new((0..frame_count).map(|f| f as f64).collect(), kernel)
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn kernel(&self) -> &WeightKernel {
        &self.kernel
    }

    /// The weight profile, for inspection before it is applied.
    pub fn profile(&self) -> Vec<f64> {
        self.kernel.evaluate(&self.domain)
    }

    /// Multiplies every contact's score array element-wise by the profile.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ProfileLengthMismatch`] if any score array differs in
    /// length from the domain. The check runs before the first contact is modified.
    pub fn apply(&self, contacts: &mut [Contact]) -> Result<(), PipelineError> {
        let profile = self.profile();
        if let Some(contact) = contacts.iter().find(|c| c.frame_count() != profile.len()) {
            return Err(PipelineError::ProfileLengthMismatch {
                expected: contact.frame_count(),
                found: profile.len(),
            });
        }
        for contact in contacts.iter_mut() {
            contact.scale_scores(&profile);
        }
        debug!(contacts = contacts.len(), kernel = ?self.kernel, "Weight function applied.");
        Ok(())
    }
}
