//! Namespace classifier
//!
//! Sorts the resolved configuration into handler, capability and interceptor
//! buckets by key prefix, and marks entries named in the bucket's prepend
//! list. Keys outside the three namespaces are ignored. An entry whose value
//! is not of the namespace's kind is rejected.

mod result;

pub use result::{Bucket, Classification, ClassifiedEntry, Component};

use serde_json::Value;

use crate::config::keys;
use crate::config::{ConfigMap, ConfigValue};
use crate::gateway::EntryKind;

/// Classification errors
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("{key} is in the {expected} namespace but holds {found}")]
    KindMismatch {
        key: String,
        expected: EntryKind,
        found: &'static str,
    },

    #[error("{key} must be a list of configuration keys")]
    InvalidPrependList { key: String },
}

/// Key prefix of entries of `kind`
pub fn namespace(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Handler => keys::HANDLER_NAMESPACE,
        EntryKind::Capability => keys::CAPABILITY_NAMESPACE,
        EntryKind::Interceptor => keys::INTERCEPTOR_NAMESPACE,
    }
}

/// Prepend-list key of `kind`
pub fn prepend_key(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Handler => keys::PREPEND_HANDLERS,
        EntryKind::Capability => keys::PREPEND_CAPABILITIES,
        EntryKind::Interceptor => keys::PREPEND_INTERCEPTORS,
    }
}

/// Classify a resolved configuration
pub fn classify(config: &ConfigMap) -> Result<Classification, ClassifyError> {
    let mut ignored_prepends = Vec::new();
    let handlers = classify_bucket(config, EntryKind::Handler, &mut ignored_prepends)?;
    let capabilities = classify_bucket(config, EntryKind::Capability, &mut ignored_prepends)?;
    let interceptors = classify_bucket(config, EntryKind::Interceptor, &mut ignored_prepends)?;

    Ok(Classification {
        handlers,
        capabilities,
        interceptors,
        ignored_prepends,
    })
}

fn classify_bucket(
    config: &ConfigMap,
    kind: EntryKind,
    ignored_prepends: &mut Vec<String>,
) -> Result<Bucket, ClassifyError> {
    let prefix = namespace(kind);
    let prepend_list = read_prepend_list(config, prepend_key(kind))?;
    let mut bucket = Bucket::new(kind);

    for (key, value) in config.iter().filter(|(key, _)| key.starts_with(prefix)) {
        let component = component_of(key, kind, value)?;
        let prepend_rank = prepend_list.iter().position(|k| k == key);
        let position = bucket.entries.len();

        tracing::debug!(key = %key, %kind, prepend = prepend_rank.is_some(), "classified entry");
        bucket.entries.push(ClassifiedEntry {
            key: key.clone(),
            component,
            prepend: prepend_rank.is_some(),
            prepend_rank,
            position,
        });
    }

    for key in prepend_list {
        if !bucket.contains_key(&key) && !ignored_prepends.contains(&key) {
            tracing::warn!(
                key = %key,
                list = prepend_key(kind),
                "prepend key names no {} entry, ignoring",
                kind
            );
            ignored_prepends.push(key);
        }
    }

    Ok(bucket)
}

fn component_of(
    key: &str,
    kind: EntryKind,
    value: &ConfigValue,
) -> Result<Component, ClassifyError> {
    match (kind, value) {
        (EntryKind::Handler, ConfigValue::Handler(h)) => Ok(Component::Handler(h.clone())),
        (EntryKind::Capability, ConfigValue::Capability(c)) => Ok(Component::Capability(c.clone())),
        (EntryKind::Interceptor, ConfigValue::Interceptor(i)) => {
            Ok(Component::Interceptor(i.clone()))
        }
        (_, other) => Err(ClassifyError::KindMismatch {
            key: key.to_string(),
            expected: kind,
            found: other.type_name(),
        }),
    }
}

/// Missing and null lists are empty
fn read_prepend_list(config: &ConfigMap, key: &str) -> Result<Vec<String>, ClassifyError> {
    let invalid = || ClassifyError::InvalidPrependList {
        key: key.to_string(),
    };

    match config.get(key) {
        None | Some(ConfigValue::Data(Value::Null)) => Ok(Vec::new()),
        Some(ConfigValue::Data(Value::Array(items))) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}
