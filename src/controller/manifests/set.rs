//! # Manifest Set
//!
//! The ordered base templates of one deployment, per release, together with
//! its transform chain. Templates are read once and never mutated; every
//! render clones them and passes the clones through the chain.

use crate::constants::{
    LABEL_MANIFEST, NIC_CLUSTER_POLICY_API_VERSION, NIC_CLUSTER_POLICY_NAME,
};
use crate::controller::deployment::Deployment;
use crate::controller::manifests::error::ManifestError;
use crate::controller::manifests::hash::ConfigHash;
use crate::controller::manifests::resource::{parse_documents, ManifestResource};
use crate::controller::manifests::transforms::{run_chain, ManifestTransform, RenderContext};
use crate::controller::reconciler::validation::{AvailableData, EffectiveConfig};
use crate::observability::metrics;
use crate::provider::{ClusterClient, ClusterError};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Templates of one release, in file then document order
#[derive(Debug, Clone)]
pub struct Release {
    pub version: String,
    pub resources: Vec<ManifestResource>,
}

/// Outcome of the readiness gate when the configuration cannot be applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Needs operator intervention
    Blocked(String),
    /// A precondition is not met yet (e.g. an option still unset)
    Waiting(String),
}

#[derive(Debug)]
pub struct ManifestSet {
    deployment: Deployment,
    app_name: String,
    /// Ascending by version
    releases: Vec<Release>,
    transforms: Vec<Box<dyn ManifestTransform>>,
}

impl ManifestSet {
    /// Load every release under `<root>/<manifest name>/manifests/`
    pub fn load(
        deployment: Deployment,
        root: &Path,
        app_name: impl Into<String>,
    ) -> Result<Self, ManifestError> {
        let dir = root.join(deployment.manifest_name()).join("manifests");
        let entries = std::fs::read_dir(&dir).map_err(|source| ManifestError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut releases = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ManifestError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let version = entry.file_name().to_string_lossy().into_owned();
            releases.push(Release {
                version,
                resources: load_release(&path)?,
            });
        }

        Self::with_releases(deployment, app_name, releases)
    }

    /// Build from already-parsed releases
    pub fn with_releases(
        deployment: Deployment,
        app_name: impl Into<String>,
        mut releases: Vec<Release>,
    ) -> Result<Self, ManifestError> {
        if releases.is_empty() {
            return Err(ManifestError::NoReleases(
                deployment.manifest_name().to_string(),
            ));
        }
        releases.sort_by(|a, b| {
            release_sort_key(&a.version)
                .cmp(&release_sort_key(&b.version))
                .then_with(|| a.version.cmp(&b.version))
        });

        debug!(
            "Loaded {} manifests with releases {:?}",
            deployment.manifest_name(),
            releases.iter().map(|r| r.version.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            deployment,
            app_name: app_name.into(),
            releases,
            transforms: deployment.transforms(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.deployment.manifest_name()
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    pub fn releases(&self) -> impl Iterator<Item = &str> {
        self.releases.iter().map(|r| r.version.as_str())
    }

    /// Newest release on disk
    pub fn default_release(&self) -> &Release {
        // with_releases rejects an empty list
        &self.releases[self.releases.len() - 1]
    }

    /// Release selected by the `release` option, newest when unset
    pub fn current_release(&self, config: &EffectiveConfig) -> Result<&Release, ManifestError> {
        match config.release() {
            None => Ok(self.default_release()),
            Some(wanted) => self
                .releases
                .iter()
                .find(|r| r.version == wanted)
                .ok_or_else(|| ManifestError::UnknownRelease {
                    manifest: self.name().to_string(),
                    release: wanted.to_string(),
                }),
        }
    }

    /// Release reported as the workload version
    pub fn version(&self, config: &EffectiveConfig) -> &str {
        self.current_release(config)
            .unwrap_or_else(|_| self.default_release())
            .version
            .as_str()
    }

    /// Effective configuration for this set
    pub fn config(&self, available: &AvailableData, namespace: &str) -> EffectiveConfig {
        EffectiveConfig::merge(available.clone(), namespace)
    }

    /// Hash of the current configuration
    pub fn hash(&self, config: &EffectiveConfig) -> ConfigHash {
        ConfigHash::of(config)
    }

    /// Determine if the configuration can be applied to the manifests
    pub fn evaluate(&self, config: &EffectiveConfig) -> Option<Evaluation> {
        if let Err(e) = self.current_release(config) {
            return Some(Evaluation::Blocked(e.to_string()));
        }
        if let Some(option) = self.deployment.custom_resource_option() {
            if config.get(option).is_none() {
                return Some(Evaluation::Waiting(format!("Waiting for {option} config")));
            }
        }
        None
    }

    /// Render every template of the current release, then the custom resource
    /// synthesized from options, through the transform chain
    pub fn render(&self, config: &EffectiveConfig) -> Result<Vec<ManifestResource>, ManifestError> {
        let release = self.current_release(config)?;
        self.render_release(release, config)
    }

    fn render_release(
        &self,
        release: &Release,
        config: &EffectiveConfig,
    ) -> Result<Vec<ManifestResource>, ManifestError> {
        let ctx = RenderContext {
            config,
            manifest: self.name(),
            release: &release.version,
            app_name: &self.app_name,
        };

        let mut rendered: Vec<ManifestResource> = release
            .resources
            .iter()
            .cloned()
            .map(|resource| run_chain(&self.transforms, resource, &ctx))
            .collect();

        // Depends on a CRD from the templated set, so it always goes last
        if let Some(custom) = self.custom_resource(config)? {
            rendered.push(run_chain(&self.transforms, custom, &ctx));
        }
        Ok(rendered)
    }

    /// Apply manifests from disk as well as those from configuration
    pub async fn apply_manifests(
        &self,
        client: &dyn ClusterClient,
        config: &EffectiveConfig,
    ) -> Result<usize, ManifestError> {
        let rendered = self.render(config)?;
        for resource in &rendered {
            client.apply(resource).await?;
            metrics::increment_resources_applied();
        }
        info!("Applied {} {} resources", rendered.len(), self.name());
        Ok(rendered.len())
    }

    /// Delete every managed resource, custom resource first
    ///
    /// A resource that is already gone counts as deleted. With
    /// `ignore_unauthorized`, so does one the API refuses to delete. A
    /// `release` that is not on disk falls back to the newest release.
    pub async fn delete_manifests(
        &self,
        client: &dyn ClusterClient,
        config: &EffectiveConfig,
        ignore_unauthorized: bool,
    ) -> Result<usize, ManifestError> {
        let release = self.current_release(config).unwrap_or_else(|e| {
            warn!("{}, deleting {} instead", e, self.default_release().version);
            self.default_release()
        });
        let rendered = self.render_release(release, config)?;
        let mut deleted = 0;
        for resource in rendered.iter().rev() {
            match client.delete(resource).await {
                Ok(()) => {
                    deleted += 1;
                    metrics::increment_resources_deleted();
                }
                Err(ClusterError::NotFound(_)) => {
                    debug!("{} already deleted", resource.identity());
                }
                Err(ClusterError::Unauthorized(message)) if ignore_unauthorized => {
                    warn!(
                        "Ignoring unauthorized delete of {}: {}",
                        resource.identity(),
                        message
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!("Deleted {} {} resources", deleted, self.name());
        Ok(deleted)
    }

    /// Sorted reasons for every resource of this set that is not ready
    pub async fn unready(&self, client: &dyn ClusterClient) -> Result<Vec<String>, ClusterError> {
        let selector = format!("{}={}", LABEL_MANIFEST, self.name());
        let mut unready: Vec<String> = client
            .list(&selector)
            .await?
            .iter()
            .filter(|status| !status.ready)
            .map(|status| status.unready_message())
            .collect();
        unready.sort();
        Ok(unready)
    }

    fn custom_resource(
        &self,
        config: &EffectiveConfig,
    ) -> Result<Option<ManifestResource>, ManifestError> {
        let Some(option) = self.deployment.custom_resource_option() else {
            return Ok(None);
        };
        let Some(document) = config.get(option) else {
            return Ok(None);
        };
        let Some(mapping) = document.as_mapping() else {
            warn!("{} is not a mapping, skipping custom resource", option);
            return Ok(None);
        };

        let mut mapping = mapping.clone();
        if !mapping.contains_key("apiVersion") {
            mapping.insert("apiVersion".into(), NIC_CLUSTER_POLICY_API_VERSION.into());
        }
        let metadata = mapping
            .entry("metadata".into())
            .or_insert_with(|| serde_yaml::Mapping::new().into());
        if !metadata.is_mapping() {
            *metadata = serde_yaml::Mapping::new().into();
        }
        if let Some(metadata) = metadata.as_mapping_mut() {
            if !metadata.contains_key("name") {
                metadata.insert("name".into(), NIC_CLUSTER_POLICY_NAME.into());
            }
        }

        ManifestResource::from_yaml(serde_yaml::Value::Mapping(mapping)).map(Some)
    }
}

fn load_release(dir: &Path) -> Result<Vec<ManifestResource>, ManifestError> {
    let mut resources = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ManifestError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if !entry.file_type().is_file() || !is_yaml {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let documents = parse_documents(&content).map_err(|e| match e {
            ManifestError::Resource(source) => ManifestError::Template {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        resources.extend(documents);
    }
    Ok(resources)
}

/// Numeric components of a release name (`v24.9.2` sorts as `[24, 9, 2]`)
fn release_sort_key(version: &str) -> Vec<u64> {
    version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}
