//! # Manifest Resource
//!
//! A single Kubernetes object description read from a template set.
//!
//! Resources are kept as [`DynamicObject`]s so the same value can be rendered,
//! printed, and handed to the cluster API without a typed round-trip.

use crate::controller::manifests::error::ManifestError;
use kube::core::{DynamicObject, ObjectMeta, TypeMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity used for apply and delete: (`kind`, `name`, `namespace`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceIdentity {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}/{}", self.kind, namespace, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestResource(DynamicObject);

impl ManifestResource {
    /// Build a resource from one parsed YAML document
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, ManifestError> {
        Ok(Self(serde_yaml::from_value(value)?))
    }

    pub fn from_dynamic(object: DynamicObject) -> Self {
        Self(object)
    }

    pub fn kind(&self) -> &str {
        self.0.types.as_ref().map_or("", |t| t.kind.as_str())
    }

    pub fn api_version(&self) -> &str {
        self.0.types.as_ref().map_or("", |t| t.api_version.as_str())
    }

    pub fn type_meta(&self) -> Option<&TypeMeta> {
        self.0.types.as_ref()
    }

    pub fn name(&self) -> &str {
        self.0.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.metadata.namespace.as_deref()
    }

    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            kind: self.kind().to_string(),
            name: self.name().to_string(),
            namespace: self.namespace().map(ToString::to_string),
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        &self.0.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.0.metadata
    }

    /// Labels, created empty when the template carries none
    pub fn labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.0.metadata.labels.get_or_insert_with(BTreeMap::new)
    }

    /// Everything outside `apiVersion`, `kind` and `metadata` (`spec`, `data`, `subjects`, ...)
    pub fn body(&self) -> &serde_json::Value {
        &self.0.data
    }

    pub fn body_mut(&mut self) -> &mut serde_json::Value {
        &mut self.0.data
    }

    pub fn as_dynamic(&self) -> &DynamicObject {
        &self.0
    }

    pub fn into_dynamic(self) -> DynamicObject {
        self.0
    }

    /// Render as a single YAML document
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml::to_string(&self.0)?)
    }
}

/// Parse every non-empty document of a multi-document YAML string
pub fn parse_documents(content: &str) -> Result<Vec<ManifestResource>, ManifestError> {
    let mut resources = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        resources.push(ManifestResource::from_yaml(value)?);
    }
    Ok(resources)
}
