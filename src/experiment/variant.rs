//! Variant record - a named prompt configuration under test

use serde::{Deserialize, Serialize};

use crate::Metadata;

/// A named configuration (prompt template plus metadata) under comparison.
///
/// Variants are registered once through the experiment store and never
/// mutated or deleted afterwards. Names need not be unique; the name
/// `"baseline"`, compared case-insensitively, is a reserved sentinel that
/// automatic-baseline analysis prefers as the reference point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    id: String,
    name: String,
    prompt_template: String,
    #[serde(default)]
    metadata: Metadata,
}

impl Variant {
    /// Create a new variant record with empty metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_template: prompt_template.into(),
            metadata: Metadata::new(),
        }
    }

    /// Create a builder for constructing a variant with optional fields.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> VariantBuilder {
        VariantBuilder::new(id, name, prompt_template)
    }

    /// Get the variant id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the prompt template. Opaque to the store.
    #[must_use]
    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    /// Get the variant metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether this variant carries the reserved baseline name.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.name.eq_ignore_ascii_case("baseline")
    }
}

/// Builder for [`Variant`].
#[derive(Debug)]
pub struct VariantBuilder {
    id: String,
    name: String,
    prompt_template: String,
    metadata: Metadata,
}

impl VariantBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_template: prompt_template.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set the variant metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the [`Variant`].
    #[must_use]
    pub fn build(self) -> Variant {
        Variant {
            id: self.id,
            name: self.name,
            prompt_template: self.prompt_template,
            metadata: self.metadata,
        }
    }
}
