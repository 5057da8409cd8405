// src/exec/resources.rs

//! Typed resource hints merged from a step's loosely-typed `resources` list.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Recognised resource hints. `None` means "not set".
///
/// Serialises flat, omitting unset keys, so it can be embedded directly in
/// the job submission payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kerberos: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_uid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_memory_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_job_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpacked_img: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voms_proxy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub htcondor_max_runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub htcondor_accounting_group: Option<String>,
}

impl ResourceHints {
    /// Merge a sequence of resource entries.
    ///
    /// Later entries override earlier ones key by key. Entries that are not
    /// JSON objects, unknown keys and values of the wrong type are skipped
    /// with a warning; `null` values leave the key untouched.
    pub fn from_entries(entries: &[Value]) -> Self {
        let mut hints = ResourceHints::default();

        for entry in entries {
            let Some(map) = entry.as_object() else {
                warn!(
                    %entry,
                    "resource entry is not a key/value object; ignoring it"
                );
                continue;
            };

            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                hints.set(key, value);
            }
        }

        hints
    }

    pub fn is_empty(&self) -> bool {
        *self == ResourceHints::default()
    }

    fn set(&mut self, key: &str, value: &Value) {
        match key {
            "compute_backend" => set_from(&mut self.compute_backend, key, value, as_string),
            "kerberos" => set_from(&mut self.kerberos, key, value, Value::as_bool),
            "kubernetes_uid" => set_from(&mut self.kubernetes_uid, key, value, Value::as_i64),
            "kubernetes_memory_limit" => {
                set_from(&mut self.kubernetes_memory_limit, key, value, as_string)
            }
            "kubernetes_job_timeout" => {
                set_from(&mut self.kubernetes_job_timeout, key, value, Value::as_i64)
            }
            "unpacked_img" => set_from(&mut self.unpacked_img, key, value, Value::as_bool),
            "voms_proxy" => set_from(&mut self.voms_proxy, key, value, Value::as_bool),
            "htcondor_max_runtime" => {
                set_from(&mut self.htcondor_max_runtime, key, value, as_string)
            }
            "htcondor_accounting_group" => {
                set_from(&mut self.htcondor_accounting_group, key, value, as_string)
            }
            other => {
                warn!(key = other, "ignoring unrecognised resource key");
            }
        }
    }
}

fn set_from<T>(slot: &mut Option<T>, key: &str, value: &Value, convert: fn(&Value) -> Option<T>) {
    match convert(value) {
        Some(v) => *slot = Some(v),
        None => warn!(key, %value, "resource value has unexpected type; ignoring it"),
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
