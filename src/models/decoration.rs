//! Decorations stored by the text model.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::edit_op::Affinity;
use super::position::Range;

slotmap::new_key_type! {
    pub struct DecorationId;
}

/// Identifies the editor that created a decoration. `0` is never handed out.
pub type OwnerId = u32;

/// How a decoration's edges react to text typed right at them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedRangeStickiness {
    #[default]
    AlwaysGrowsWhenTypingAtEdges,
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    GrowsOnlyWhenTypingAfter,
}

impl TrackedRangeStickiness {
    /// Affinities for the (start, end) edges.
    pub fn edge_affinities(self) -> (Affinity, Affinity) {
        use Affinity::{After, Before};
        match self {
            Self::AlwaysGrowsWhenTypingAtEdges => (Before, After),
            Self::NeverGrowsWhenTypingAtEdges => (After, Before),
            Self::GrowsOnlyWhenTypingBefore => (Before, Before),
            Self::GrowsOnlyWhenTypingAfter => (After, After),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDecorationOptions {
    pub class_name: Option<CompactString>,
    pub inline_class_name: Option<CompactString>,
    pub hover_message: Option<String>,
    pub z_index: i32,
    pub is_whole_line: bool,
    pub stickiness: TrackedRangeStickiness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDecoration {
    pub id: DecorationId,
    pub owner_id: OwnerId,
    pub range: Range,
    pub options: ModelDecorationOptions,
}

/// Input to `delta_decorations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaDecoration {
    pub range: Range,
    pub options: ModelDecorationOptions,
}

impl DeltaDecoration {
    pub fn new(range: Range, options: ModelDecorationOptions) -> Self {
        Self { range, options }
    }
}
