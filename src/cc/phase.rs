//! Phase ordering for multi-stage collectives.

use tracing::debug;

use crate::error::ScheduleError;
use crate::graph::OpId;

/// Runs phases in order for one rank. Each phase gets a fresh tag and the
/// handle left behind by the previous phase.
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    /// `None` once the tag space is used up.
    tag: Option<u32>,
    handle: Option<OpId>,
    phases: usize,
}

impl PhaseSequencer {
    pub fn new(base_tag: u32) -> Self {
        Self {
            tag: Some(base_tag),
            handle: None,
            phases: 0,
        }
    }

    /// Tag the next phase will run under.
    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// Last operation of the most recent phase.
    pub fn handle(&self) -> Option<OpId> {
        self.handle
    }

    pub fn phases(&self) -> usize {
        self.phases
    }

    /// Run `build(tag, predecessor)`; it returns the handle for the next phase.
    /// Fails with [`ScheduleError::TagOverflow`] without calling `build` when
    /// the previous phase already used `u32::MAX`.
    pub fn phase<F>(&mut self, name: &'static str, build: F) -> Result<(), ScheduleError>
    where
        F: FnOnce(u32, Option<OpId>) -> Result<Option<OpId>, ScheduleError>,
    {
        let tag = self.tag.ok_or(ScheduleError::TagOverflow(u32::MAX))?;
        let handle = build(tag, self.handle)?;
        debug!(phase = name, tag, ?handle, "phase built");
        // An empty phase keeps the earlier handle alive for the next one.
        if handle.is_some() {
            self.handle = handle;
        }
        self.tag = tag.checked_add(1);
        self.phases += 1;
        Ok(())
    }
}
