use super::chunker::FrameChunk;
use super::config::KernelParams;
use super::error::KernelError;
use super::kernel::detect_frame_contacts;
use crate::core::models::atom_contact::AtomContact;
use crate::core::models::topology::Topology;
use tracing::{debug, instrument};

/// Runs the contact kernel over every frame of a chunk.
///
/// Frame ids are global: frame `k` of the chunk is reported as `first_frame + k`.
///
/// # Return
///
/// One contact list per frame, in chunk order.
#[instrument(skip_all, name = "contact_worker", fields(chunk = chunk.index, frames = chunk.frames.len()))]
pub fn process_chunk(
    chunk: &FrameChunk,
    topology: &Topology,
    params: &KernelParams,
) -> Result<Vec<Vec<AtomContact>>, KernelError> {
    if chunk.is_empty() {
        return Ok(Vec::new());
    }
    let results = chunk
        .frames
        .iter()
        .enumerate()
        .map(|(offset, frame)| {
            detect_frame_contacts(chunk.first_frame + offset, frame, topology, params)
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        first_frame = chunk.first_frame,
        contacts = results.iter().map(Vec::len).sum::<usize>(),
        "Chunk processed."
    );
    Ok(results)
}
