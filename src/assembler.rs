//! Pipeline assembly
//!
//! Writes classified entries into a pipeline bucket by bucket: handlers,
//! then capabilities, then interceptors. Within a bucket the prepended
//! entries are inserted at the head in reverse declared order, so the chain
//! starts with them in declared order; the rest are appended in mapping order.

use std::sync::Arc;

use crate::classifier::{Classification, ClassifiedEntry, Component};
use crate::gateway::{Pipeline, PipelineError};

/// Register every classified entry on `pipeline`.
///
/// The first pipeline error aborts assembly and is returned unchanged.
pub fn assemble<P: Pipeline + ?Sized>(
    pipeline: &mut P,
    classification: &Classification,
) -> Result<(), PipelineError> {
    for bucket in classification.buckets() {
        for entry in bucket.prepended().into_iter().rev() {
            add_entry(pipeline, entry, true)?;
        }
        for entry in bucket.appended() {
            add_entry(pipeline, entry, false)?;
        }
        tracing::debug!(kind = %bucket.kind, count = bucket.len(), "assembled bucket");
    }
    Ok(())
}

fn add_entry<P: Pipeline + ?Sized>(
    pipeline: &mut P,
    entry: &ClassifiedEntry,
    prepend: bool,
) -> Result<(), PipelineError> {
    tracing::trace!(key = %entry.key, prepend, "adding entry");
    match &entry.component {
        Component::Handler(h) => pipeline.add_handler(Arc::clone(h), prepend),
        Component::Capability(c) => pipeline.add_capability(Arc::clone(c), prepend),
        Component::Interceptor(i) => pipeline.add_interceptor(Arc::clone(i), prepend),
    }
}
