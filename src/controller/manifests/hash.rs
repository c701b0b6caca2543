//! # Configuration Hash
//!
//! A 128-bit MD5 digest over the canonical JSON serialization of an effective
//! configuration. Mapping keys are sorted at every depth, so the digest only
//! depends on content and never on the order options were supplied in.

use crate::controller::reconciler::validation::EffectiveConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ConfigHash(u128);

impl ConfigHash {
    pub const ZERO: ConfigHash = ConfigHash(0);

    pub fn of(config: &EffectiveConfig) -> Self {
        let canonical = canonical_options(config.options());
        // Serializing a serde_json::Value cannot fail
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        Self(u128::from_be_bytes(md5::compute(bytes).0))
    }

    /// Combine per-manifest hashes; addition keeps the result independent of set order
    #[must_use]
    pub fn combine(self, other: ConfigHash) -> Self {
        Self(self.0.wrapping_add(other.0))
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl From<u128> for ConfigHash {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl From<ConfigHash> for String {
    fn from(hash: ConfigHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for ConfigHash {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        u128::from_str_radix(&value, 16).map(Self)
    }
}

fn canonical_options(options: &BTreeMap<String, serde_yaml::Value>) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (key, value) in options {
        object.insert(key.clone(), canonical(value));
    }
    serde_json::Value::Object(object)
}

/// YAML value as JSON with every mapping's keys in sorted order
fn canonical(value: &serde_yaml::Value) -> serde_json::Value {
    use serde_yaml::Value;

    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or_else(|| serde_json::Value::String(n.to_string()), serde_json::Value::Number)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(canonical).collect()),
        Value::Mapping(mapping) => {
            let sorted: BTreeMap<String, serde_json::Value> = mapping
                .iter()
                .map(|(k, v)| (canonical_key(k), canonical(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        Value::Tagged(tagged) => {
            let mut object = serde_json::Map::new();
            object.insert(tagged.tag.to_string(), canonical(&tagged.value));
            serde_json::Value::Object(object)
        }
    }
}

fn canonical_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_json::to_string(&canonical(other)).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::reconciler::validation::{
        ConfigValidator, FieldSchema, GovernedField, RawConfig,
    };

    fn effective(pairs: &[(&str, &str)]) -> EffectiveConfig {
        let validator = ConfigValidator::new(&[GovernedField {
            name: "nfd-worker-conf",
            required: true,
            schema: FieldSchema::NfdWorker,
        }]);
        let raw: RawConfig = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).into()))
            .collect();
        EffectiveConfig::merge(validator.available_data(&raw), "default")
    }

    #[test]
    fn test_hash_ignores_nested_key_order() {
        let a = effective(&[("nfd-worker-conf", "sources: {pci: {}, usb: {}}\ncore: {sleepInterval: 60s}")]);
        let b = effective(&[("nfd-worker-conf", "core: {sleepInterval: 60s}\nsources: {usb: {}, pci: {}}")]);
        assert_eq!(ConfigHash::of(&a), ConfigHash::of(&b));
    }

    #[test]
    fn test_hash_changes_with_content() {
        let a = effective(&[("nfd-worker-conf", "sources: {}")]);
        let b = effective(&[("nfd-worker-conf", "sources: {pci: {}}")]);
        assert_ne!(ConfigHash::of(&a), ConfigHash::of(&b));
    }

    #[test]
    fn test_empty_option_does_not_change_hash() {
        let a = effective(&[("nfd-worker-conf", "sources: {}")]);
        let b = effective(&[("nfd-worker-conf", "sources: {}"), ("image-registry", "")]);
        assert_eq!(ConfigHash::of(&a), ConfigHash::of(&b));
    }

    #[test]
    fn test_hash_string_round_trip() {
        let hash = ConfigHash::from(0xdead_beef_u128);
        let text = String::from(hash);
        assert_eq!(text.len(), 32);
        assert_eq!(ConfigHash::try_from(text).unwrap(), hash);
    }

    #[test]
    fn test_combine_is_order_independent() {
        let a = ConfigHash::from(u128::MAX);
        let b = ConfigHash::from(7_u128);
        assert_eq!(a.combine(b), b.combine(a));
    }
}
