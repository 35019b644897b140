//! Configuration for raster loading and sampling.

use std::time::Duration;

use geo_common::EdgePolicy;
use serde::{Deserialize, Serialize};

use crate::error::OpenError;

/// Configuration for a [`GeoRaster`](crate::GeoRaster).
///
/// Deserializes from YAML such as:
///
/// ```yaml
/// load_timeout_ms: 10000
/// channel_layout: native
/// edge_policy: exclusive
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Give up on an input that has not loaded after this long.
    /// `None` waits forever.
    #[serde(rename = "load_timeout_ms", with = "optional_millis")]
    pub load_timeout: Option<Duration>,

    /// Channel layout of sampled pixels.
    pub channel_layout: ChannelLayout,

    /// Treatment of coordinates on the southern and eastern raster edge.
    pub edge_policy: EdgePolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            load_timeout: None,
            channel_layout: ChannelLayout::Rgba,
            edge_policy: EdgePolicy::Clamp,
        }
    }
}

impl SamplerConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, OpenError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| OpenError::Config(e.to_string()))?;
        config.validate().map_err(OpenError::Config)?;
        Ok(config)
    }

    /// Set the load timeout.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Set the channel layout.
    pub fn with_channel_layout(mut self, layout: ChannelLayout) -> Self {
        self.channel_layout = layout;
        self
    }

    /// Set the edge policy.
    pub fn with_edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.edge_policy = policy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.load_timeout == Some(Duration::ZERO) {
            return Err("load_timeout_ms must be > 0".to_string());
        }

        Ok(())
    }
}

/// Channel layout of sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// Four channels (red, green, blue, alpha) whatever the source holds.
    #[default]
    Rgba,
    /// The source's own channel count, reduced to 8 bits per channel.
    Native,
}

impl ChannelLayout {
    /// Get the layout name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rgba => "rgba",
            Self::Native => "native",
        }
    }
}

impl std::fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SamplerConfig::default();
        assert_eq!(config.load_timeout, None);
        assert_eq!(config.channel_layout, ChannelLayout::Rgba);
        assert_eq!(config.edge_policy, EdgePolicy::Clamp);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = SamplerConfig::default().with_load_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SamplerConfig::default().with_load_timeout(Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml() {
        let config = SamplerConfig::from_yaml_str(
            "load_timeout_ms: 2500\nchannel_layout: native\nedge_policy: exclusive\n",
        )
        .unwrap();

        assert_eq!(config.load_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.channel_layout, ChannelLayout::Native);
        assert_eq!(config.edge_policy, EdgePolicy::Exclusive);
    }

    #[test]
    fn test_from_yaml_partial_uses_defaults() {
        let config = SamplerConfig::from_yaml_str("channel_layout: native\n").unwrap();
        assert_eq!(config.load_timeout, None);
        assert_eq!(config.edge_policy, EdgePolicy::Clamp);
    }

    #[test]
    fn test_from_yaml_rejects_zero_timeout_and_unknown_layout() {
        assert!(matches!(
            SamplerConfig::from_yaml_str("load_timeout_ms: 0\n"),
            Err(OpenError::Config(_))
        ));
        assert!(matches!(
            SamplerConfig::from_yaml_str("channel_layout: cmyk\n"),
            Err(OpenError::Config(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip_keeps_timeout_in_millis() {
        let config = SamplerConfig::default().with_load_timeout(Duration::from_secs(3));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("load_timeout_ms: 3000"));
    }
}
