//! 内核配置

use crate::error::Result;
use crate::geometry::DEFAULT_SEGMENTS_PER_SPAN;
use serde::{Deserialize, Serialize};

/// 内核配置
///
/// 所有字段都有默认值，JSON 中缺省的字段取默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// 点选容差（世界坐标单位）
    pub pick_tolerance: f64,
    /// 样条求值时每个跨段的采样数
    pub spline_segments_per_span: usize,
    /// 交点去重容差
    pub merge_tolerance: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: 0.5,
            spline_segments_per_span: DEFAULT_SEGMENTS_PER_SPAN,
            merge_tolerance: 1e-9,
        }
    }
}

impl KernelConfig {
    /// 从 JSON 文本加载
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: KernelConfig = serde_json::from_str(json)?;
        tracing::debug!(?config, "kernel config loaded");
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = KernelConfig::from_json_str(r#"{ "pick_tolerance": 2.0 }"#).unwrap();
        assert_eq!(config.pick_tolerance, 2.0);
        assert_eq!(config.spline_segments_per_span, DEFAULT_SEGMENTS_PER_SPAN);
        assert_eq!(config.merge_tolerance, 1e-9);
    }

    #[test]
    fn test_json_round_trip() {
        let config = KernelConfig {
            pick_tolerance: 0.1,
            spline_segments_per_span: 8,
            merge_tolerance: 1e-6,
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(KernelConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = KernelConfig::from_json_str("{ pick_tolerance: }").unwrap_err();
        assert!(matches!(err, KernelError::Config(_)));
    }
}
