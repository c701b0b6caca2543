//! ConfigMap data injection for the node-feature-discovery worker configuration.

use super::{skip, ManifestTransform, RenderContext};
use crate::constants::NFD_WORKER_CONF_DATA_KEY;
use crate::controller::manifests::resource::ManifestResource;
use tracing::{error, info};

/// Writes the `nfd-worker-conf` option into the NFD worker ConfigMap
///
/// The templates ship a default ConfigMap; this replaces its
/// `nfd-worker.conf` entry with the configured document serialized as YAML.
#[derive(Debug, Clone)]
pub struct ConfigMapDataInjector {
    config_map: &'static str,
}

impl ConfigMapDataInjector {
    const NAME: &'static str = "nfd-config-map";

    pub fn new(config_map: &'static str) -> Self {
        Self { config_map }
    }

    pub fn config_map(&self) -> &str {
        self.config_map
    }
}

impl ManifestTransform for ConfigMapDataInjector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, mut resource: ManifestResource, ctx: &RenderContext<'_>) -> ManifestResource {
        if !(resource.kind() == "ConfigMap" && resource.name() == self.config_map) {
            return resource;
        }

        let config = match ctx.config.nfd_worker_conf() {
            Some(config) if config.is_mapping() => config,
            other => {
                error!(
                    "nfd-worker-conf was an unexpected type: {}",
                    yaml_type_name(other)
                );
                return resource;
            }
        };

        let rendered = match serde_yaml::to_string(config) {
            Ok(rendered) => rendered,
            Err(e) => {
                skip(Self::NAME, &resource, &e.to_string());
                return resource;
            }
        };

        let writable = match resource.body() {
            serde_json::Value::Null => true,
            serde_json::Value::Object(body) => body
                .get("data")
                .is_none_or(|data| data.is_null() || data.is_object()),
            _ => false,
        };
        if !writable {
            skip(Self::NAME, &resource, "data is not a mapping");
            return resource;
        }

        info!("Applying Node Feature Discovery ConfigMap Data");
        let body = resource.body_mut();
        if !body.is_object() {
            *body = serde_json::Value::Object(serde_json::Map::new());
        }
        if let Some(body) = body.as_object_mut() {
            let data = body
                .entry("data")
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if !data.is_object() {
                *data = serde_json::Value::Object(serde_json::Map::new());
            }
            if let Some(data) = data.as_object_mut() {
                data.insert(
                    NFD_WORKER_CONF_DATA_KEY.to_string(),
                    serde_json::Value::String(rendered),
                );
            }
        }
        resource
    }
}

fn yaml_type_name(value: Option<&serde_yaml::Value>) -> &'static str {
    match value {
        None | Some(serde_yaml::Value::Null) => "null",
        Some(serde_yaml::Value::Bool(_)) => "bool",
        Some(serde_yaml::Value::Number(_)) => "number",
        Some(serde_yaml::Value::String(_)) => "string",
        Some(serde_yaml::Value::Sequence(_)) => "sequence",
        Some(serde_yaml::Value::Mapping(_)) => "mapping",
        Some(serde_yaml::Value::Tagged(_)) => "tagged",
    }
}
