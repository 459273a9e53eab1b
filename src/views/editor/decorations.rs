//! Per-editor bookkeeping for type-keyed decorations.
//!
//! Remembers, for every decoration type key, the ids this editor placed in
//! the model and the sub-types it registered in the shared type service.

use compact_str::{format_compact, CompactString};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::error::{EditorError, Result};
use crate::kernel::decoration_types::{
    render_options_hash, subtype_key, DecorationRenderOptions, DecorationTypeService,
};
use crate::models::{DecorationId, DeltaDecoration, OwnerId, Range, TextModel};

/// One decoration passed to `set_decorations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationOptions {
    pub range: Range,
    pub hover_message: Option<String>,
    pub render_options: Option<DecorationRenderOptions>,
}

impl DecorationOptions {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            hover_message: None,
            render_options: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct EditorDecorations {
    key_to_ids: FxHashMap<CompactString, Vec<DecorationId>>,
    key_to_subtypes: FxHashMap<CompactString, FxHashSet<CompactString>>,
}

fn ensure_type(types: &DecorationTypeService, key: &str) -> Result<()> {
    if types.has_type(key) {
        Ok(())
    } else {
        Err(EditorError::invalid(format!("unknown decoration type key: {key}")))
    }
}

impl EditorDecorations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids_for(&self, key: &str) -> &[DecorationId] {
        self.key_to_ids.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subtypes_for(&self, key: &str) -> usize {
        self.key_to_subtypes.get(key).map_or(0, FxHashSet::len)
    }

    /// Replaces every decoration of `key`. Custom render options are
    /// registered as sub-types, shared by all decorations with equal options.
    pub fn set_decorations(
        &mut self,
        types: &mut DecorationTypeService,
        model: &mut TextModel,
        owner: OwnerId,
        key: &str,
        decorations: &[DecorationOptions],
    ) -> Result<()> {
        ensure_type(types, key)?;

        let old_subtypes = self.key_to_subtypes.remove(key).unwrap_or_default();
        let mut new_subtypes: FxHashSet<CompactString> = FxHashSet::default();
        let mut new_decorations = Vec::with_capacity(decorations.len());

        for decoration in decorations {
            let type_key = match &decoration.render_options {
                Some(render_options) => {
                    let subtype = format_compact!("{:x}", render_options_hash(render_options));
                    let type_key = subtype_key(key, &subtype);
                    if !old_subtypes.contains(&subtype) && !new_subtypes.contains(&subtype) {
                        types.register_decoration_type(&type_key, render_options.clone(), Some(key));
                    }
                    new_subtypes.insert(subtype);
                    type_key
                }
                None => CompactString::from(key),
            };
            let mut options = types.resolve_decoration_options(&type_key)?;
            if decoration.hover_message.is_some() {
                options.hover_message = decoration.hover_message.clone();
            }
            new_decorations.push(DeltaDecoration::new(decoration.range, options));
        }

        for subtype in old_subtypes.difference(&new_subtypes) {
            types.remove_decoration_type(&subtype_key(key, subtype));
        }
        self.key_to_subtypes.insert(CompactString::from(key), new_subtypes);

        let old_ids = self.key_to_ids.remove(key).unwrap_or_default();
        let ids = model.delta_decorations(owner, &old_ids, &new_decorations);
        self.key_to_ids.insert(CompactString::from(key), ids);
        Ok(())
    }

    /// Bulk path: one shared options object, no hover messages, no sub-types.
    pub fn set_decorations_fast(
        &mut self,
        types: &mut DecorationTypeService,
        model: &mut TextModel,
        owner: OwnerId,
        key: &str,
        ranges: &[Range],
    ) -> Result<()> {
        ensure_type(types, key)?;
        let options = types.resolve_decoration_options(key)?;

        self.drop_subtypes(types, key);
        self.key_to_subtypes
            .insert(CompactString::from(key), FxHashSet::default());

        let new_decorations: Vec<DeltaDecoration> = ranges
            .iter()
            .map(|range| DeltaDecoration::new(*range, options.clone()))
            .collect();
        let old_ids = self.key_to_ids.remove(key).unwrap_or_default();
        let ids = model.delta_decorations(owner, &old_ids, &new_decorations);
        self.key_to_ids.insert(CompactString::from(key), ids);
        Ok(())
    }

    /// Removes the decorations and sub-types of `key`. Unknown keys are fine.
    pub fn remove_decorations(
        &mut self,
        types: &mut DecorationTypeService,
        model: &mut TextModel,
        owner: OwnerId,
        key: &str,
    ) {
        if let Some(old_ids) = self.key_to_ids.remove(key) {
            model.delta_decorations(owner, &old_ids, &[]);
        }
        self.drop_subtypes(types, key);
    }

    /// Forgets every key and deregisters every sub-type. Decorations in the
    /// model are left to the caller.
    pub fn clear(&mut self, types: &mut DecorationTypeService) {
        for (key, subtypes) in self.key_to_subtypes.drain() {
            for subtype in subtypes {
                types.remove_decoration_type(&subtype_key(&key, &subtype));
            }
        }
        self.key_to_ids.clear();
    }

    fn drop_subtypes(&mut self, types: &mut DecorationTypeService, key: &str) {
        if let Some(subtypes) = self.key_to_subtypes.remove(key) {
            for subtype in subtypes {
                types.remove_decoration_type(&subtype_key(key, &subtype));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/views/editor/decorations.rs"]
mod tests;
