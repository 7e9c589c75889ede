//! Editor tuning knobs.
//!
//! Every field has a default, so a host can deserialize a partial JSON object
//! and get the stock behavior for everything it leaves out.

use crate::canvas::CanvasMargins;
use crate::quadtree::SplitPolicy;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid editor config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Items a quadtree leaf holds before it splits.
    pub split_threshold: usize,
    /// Deepest quadtree level that may still split.
    pub max_index_depth: usize,
    /// Smallest width and height a resize may produce.
    pub min_node_size: f64,
    /// Side of the square hot zone at each corner that starts a resize.
    pub handle_hot_zone: f64,
    /// Side of the painted handle square.
    pub handle_size: f64,
    /// Inset of the inner box; pressing inside it moves rather than resizes.
    pub inner_inset: f64,
    /// After a clamped move, the grip stays at least this far inside the box.
    pub grip_inset: f64,
    /// Max pointer distance from a connector line that still hits it.
    pub connector_tolerance: f64,
    /// Width of a newly placed node.
    pub node_width: f64,
    /// Height of a newly placed node.
    pub node_height: f64,
    /// Frames per caret on/off phase.
    pub caret_blink_period: u32,
    /// Height of one tool palette slot.
    pub palette_slot: f64,
    pub margins: CanvasMargins,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            split_threshold: 6,
            max_index_depth: 8,
            min_node_size: 50.0,
            handle_hot_zone: 15.0,
            handle_size: 8.0,
            inner_inset: 15.0,
            grip_inset: 20.0,
            connector_tolerance: 5.0,
            node_width: 150.0,
            node_height: 100.0,
            caret_blink_period: 30,
            palette_slot: 100.0,
            margins: CanvasMargins::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split_threshold == 0 {
            return Err(ConfigError::Invalid("split_threshold must be at least 1".into()));
        }
        if self.caret_blink_period == 0 {
            return Err(ConfigError::Invalid("caret_blink_period must be at least 1".into()));
        }
        let lengths = [
            ("min_node_size", self.min_node_size),
            ("handle_hot_zone", self.handle_hot_zone),
            ("handle_size", self.handle_size),
            ("inner_inset", self.inner_inset),
            ("grip_inset", self.grip_inset),
            ("connector_tolerance", self.connector_tolerance),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("palette_slot", self.palette_slot),
            ("margins.left", self.margins.left),
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
        ];
        if let Some((name, value)) = lengths.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be a non-negative length, got {value}"
            )));
        }
        if self.node_width < self.min_node_size || self.node_height < self.min_node_size {
            return Err(ConfigError::Invalid(
                "default node size is below min_node_size".into(),
            ));
        }
        Ok(())
    }

    pub fn split_policy(&self) -> SplitPolicy {
        SplitPolicy {
            threshold: self.split_threshold,
            max_depth: self.max_index_depth,
        }
    }

    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }
}
