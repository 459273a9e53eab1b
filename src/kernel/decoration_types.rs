//! Decoration type registry shared by every editor of a host.
//!
//! A type key names a set of render options. Editors that pass custom render
//! options per decoration get sub-types keyed `"{type_key}-{hash:x}"`, so
//! identical styles collapse into one registration.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use compact_str::{format_compact, CompactString};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EditorError, Result};
use crate::models::{ModelDecorationOptions, TrackedRangeStickiness};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecorationRenderOptions {
    pub class_name: Option<CompactString>,
    pub inline_class_name: Option<CompactString>,
    pub color: Option<CompactString>,
    pub background_color: Option<CompactString>,
    pub before_content: Option<String>,
    pub after_content: Option<String>,
    pub is_whole_line: Option<bool>,
    pub z_index: Option<i32>,
    pub stickiness: Option<TrackedRangeStickiness>,
}

impl DecorationRenderOptions {
    /// Fields set on `self` win over `parent`.
    fn merged_over(&self, parent: &DecorationRenderOptions) -> DecorationRenderOptions {
        DecorationRenderOptions {
            class_name: self.class_name.clone().or_else(|| parent.class_name.clone()),
            inline_class_name: self
                .inline_class_name
                .clone()
                .or_else(|| parent.inline_class_name.clone()),
            color: self.color.clone().or_else(|| parent.color.clone()),
            background_color: self
                .background_color
                .clone()
                .or_else(|| parent.background_color.clone()),
            before_content: self
                .before_content
                .clone()
                .or_else(|| parent.before_content.clone()),
            after_content: self.after_content.clone().or_else(|| parent.after_content.clone()),
            is_whole_line: self.is_whole_line.or(parent.is_whole_line),
            z_index: self.z_index.or(parent.z_index),
            stickiness: self.stickiness.or(parent.stickiness),
        }
    }

    fn has_style(&self) -> bool {
        self.color.is_some() || self.background_color.is_some()
    }

    fn has_inline_content(&self) -> bool {
        self.before_content.is_some() || self.after_content.is_some()
    }
}

/// Stable content hash used for sub-type keys.
pub fn render_options_hash(options: &DecorationRenderOptions) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    options.hash(&mut hasher);
    hasher.finish()
}

pub fn subtype_key(type_key: &str, subtype: &str) -> CompactString {
    format_compact!("{type_key}-{subtype}")
}

fn generated_class(key: &str, suffix: &str) -> CompactString {
    let sanitized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format_compact!("ced-{sanitized}{suffix}")
}

#[derive(Debug, Clone)]
struct DecorationType {
    options: DecorationRenderOptions,
    parent: Option<CompactString>,
    ref_count: usize,
}

#[derive(Debug, Default)]
pub struct DecorationTypeService {
    types: FxHashMap<CompactString, DecorationType>,
}

pub type SharedDecorationTypes = Rc<RefCell<DecorationTypeService>>;

impl DecorationTypeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDecorationTypes {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Registers `key`, or bumps its reference count when it already exists.
    pub fn register_decoration_type(
        &mut self,
        key: &str,
        options: DecorationRenderOptions,
        parent: Option<&str>,
    ) {
        if let Some(existing) = self.types.get_mut(key) {
            existing.ref_count += 1;
            return;
        }
        tracing::debug!(key, parent, "register decoration type");
        self.types.insert(
            CompactString::from(key),
            DecorationType {
                options,
                parent: parent.map(CompactString::from),
                ref_count: 1,
            },
        );
    }

    /// Drops one reference; the type disappears with its last reference.
    pub fn remove_decoration_type(&mut self, key: &str) {
        let Some(entry) = self.types.get_mut(key) else {
            return;
        };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            tracing::debug!(key, "remove decoration type");
            self.types.remove(key);
        }
    }

    pub fn has_type(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of registered sub-types whose parent is `parent`.
    pub fn subtype_count(&self, parent: &str) -> usize {
        self.types
            .values()
            .filter(|entry| entry.parent.as_deref() == Some(parent))
            .count()
    }

    /// Render options of `key`, merged over its parent's.
    pub fn render_options(&self, key: &str) -> Option<DecorationRenderOptions> {
        let entry = self.types.get(key)?;
        let merged = match entry.parent.as_deref().and_then(|parent| self.types.get(parent)) {
            Some(parent) => entry.options.merged_over(&parent.options),
            None => entry.options.clone(),
        };
        Some(merged)
    }

    pub fn resolve_decoration_options(&self, key: &str) -> Result<ModelDecorationOptions> {
        let options = self
            .render_options(key)
            .ok_or_else(|| EditorError::invalid(format!("unknown decoration type key: {key}")))?;

        let has_style = options.has_style();
        let has_inline_content = options.has_inline_content();
        let class_name = match options.class_name {
            Some(class_name) => Some(class_name),
            None if has_style => Some(generated_class(key, "")),
            None => None,
        };
        let inline_class_name = match options.inline_class_name {
            Some(inline) => Some(inline),
            None if has_inline_content => Some(generated_class(key, "-inline")),
            None => None,
        };

        Ok(ModelDecorationOptions {
            class_name,
            inline_class_name,
            hover_message: None,
            z_index: options.z_index.unwrap_or(0),
            is_whole_line: options.is_whole_line.unwrap_or(false),
            stickiness: options.stickiness.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/decoration_types.rs"]
mod tests;
