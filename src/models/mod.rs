//! Data model layer: positions, selections, edits and the text model.

pub mod cursor_set;
pub mod decoration;
pub mod edit_op;
pub mod position;
pub mod selection;
pub mod text_model;

pub use decoration::{
    DecorationId, DeltaDecoration, ModelDecoration, ModelDecorationOptions, OwnerId,
    TrackedRangeStickiness,
};
pub use edit_op::{Affinity, AppliedEdit, SingleEditOperation};
pub use position::{Position, Range};
pub use selection::{Selection, SelectionDirection};
pub use text_model::{
    slice_to_cow, ContentChangedEvent, DecorationsAccessor, ModelEvent, ModelId, ModelListenerId,
    ModelSubscription, TextModel, TextModelOptions, UndoStep,
};
