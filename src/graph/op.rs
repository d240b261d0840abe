//! Operations stored in a schedule.

use super::id::OpId;

/// What an operation does. Peers are global ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Send { dst: usize, size: u64, tag: u32 },
    Recv { src: usize, size: u64, tag: u32 },
    /// Local computation, `cost` in simulator time units.
    Calc { cost: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    /// Operations that must complete before this one is ready.
    pub requires: Vec<OpId>,
}

impl Op {
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            requires: Vec::new(),
        }
    }

    pub fn is_send(&self) -> bool {
        matches!(self.kind, OpKind::Send { .. })
    }

    pub fn is_recv(&self) -> bool {
        matches!(self.kind, OpKind::Recv { .. })
    }

    /// Remote rank for sends and receives.
    pub fn peer(&self) -> Option<usize> {
        match self.kind {
            OpKind::Send { dst, .. } => Some(dst),
            OpKind::Recv { src, .. } => Some(src),
            OpKind::Calc { .. } => None,
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self.kind {
            OpKind::Send { size, .. } | OpKind::Recv { size, .. } => Some(size),
            OpKind::Calc { .. } => None,
        }
    }

    pub fn tag(&self) -> Option<u32> {
        match self.kind {
            OpKind::Send { tag, .. } | OpKind::Recv { tag, .. } => Some(tag),
            OpKind::Calc { .. } => None,
        }
    }
}
