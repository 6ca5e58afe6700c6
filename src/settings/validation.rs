//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (periodic interval > 0)
//! - Detect duplicate resolver stages and blank tags
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProviderSettings → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;

use crate::settings::schema::{ProviderSettings, ReloadKind};

/// A single semantic problem in a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("reload.interval_secs must be greater than zero for the periodic strategy")]
    ZeroInterval,

    #[error("resolver stage {0:?} is listed more than once")]
    DuplicateResolver(String),

    #[error("source.files must list at least one file")]
    NoSourceFiles,

    #[error("tag #{0} is blank")]
    BlankTag(usize),
}

/// Check `settings` for problems serde cannot express.
pub fn validate_settings(settings: &ProviderSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.reload.strategy == ReloadKind::Periodic && settings.reload.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    let mut seen = HashSet::new();
    for kind in &settings.resolvers {
        if !seen.insert(*kind) {
            errors.push(ValidationError::DuplicateResolver(format!("{:?}", kind).to_lowercase()));
        }
    }

    if settings.source.files.is_empty() {
        errors.push(ValidationError::NoSourceFiles);
    }

    for (i, tag) in settings.tags.iter().enumerate() {
        if tag.trim().is_empty() {
            errors.push(ValidationError::BlankTag(i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
