//! Rendered chart images attached to analyses and comparisons.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chart family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    Line,
    Scatter,
}

/// A rasterized chart, PNG encoded as standard base64
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartImage {
    #[schema(example = "Porter's Five Forces intensity")]
    pub title: String,
    pub kind: ChartKind,
    /// Category or point labels, in drawing order
    pub labels: Vec<String>,
    /// Series names for grouped charts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub png_base64: String,
}
