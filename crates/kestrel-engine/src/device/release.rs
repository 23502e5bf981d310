use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{BufferId, GpuBackend, PipelineId, SamplerId, TextureId};

/// A GPU handle whose owner has been dropped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Release {
    Texture(TextureId),
    Pipeline(PipelineId),
    Buffer(BufferId),
    Sampler(SamplerId),
}

impl Release {
    pub(crate) fn apply<B: GpuBackend + ?Sized>(self, backend: &mut B) {
        match self {
            Release::Texture(id) => backend.destroy_texture(id),
            Release::Pipeline(id) => backend.destroy_pipeline(id),
            Release::Buffer(id) => backend.destroy_buffer(id),
            Release::Sampler(id) => backend.destroy_sampler(id),
        }
    }
}

/// Handles waiting to be destroyed.
///
/// Owners push on drop; the graphics device drains the queue only while no
/// command buffer is in flight, so a handle referenced by recorded commands
/// outlives their submission.
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue {
    pending: Rc<RefCell<Vec<Release>>>,
}

impl ReleaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, release: Release) {
        self.pending.borrow_mut().push(release);
    }

    pub(crate) fn take(&self) -> Vec<Release> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Number of handles waiting for release.
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

/// Enqueues its handle on drop.
#[derive(Debug)]
pub(crate) struct ResourceGuard {
    queue: ReleaseQueue,
    release: Release,
}

impl ResourceGuard {
    pub(crate) fn new(queue: ReleaseQueue, release: Release) -> Self {
        Self { queue, release }
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.queue.push(self.release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_enqueues_on_drop() {
        let queue = ReleaseQueue::new();
        let guard = ResourceGuard::new(queue.clone(), Release::Texture(TextureId(4)));
        assert!(queue.is_empty());

        drop(guard);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take(), vec![Release::Texture(TextureId(4))]);
        assert!(queue.is_empty());
    }
}
