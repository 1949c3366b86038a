use serde::{Deserialize, Serialize};

/// How the encoder treats function names the registry does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionMode {
    /// Fail the encode call.
    #[default]
    Strict,
    /// Emit an `sp:UnresolvedFunction` placeholder carrying the raw name.
    Lenient,
}

/// Limits and policies for one encoder or decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub function_mode: FunctionMode,
    /// Maximum recursion depth (algebra nesting on encode, graph nesting on
    /// decode).
    pub max_depth: usize,
    /// Maximum nodes minted by one encode call, or visited by one decode call.
    pub max_nodes: usize,
    /// Maximum cells in a single list chain on decode.
    pub max_list_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            function_mode: FunctionMode::Strict,
            max_depth: 256,
            max_nodes: 1_000_000,
            max_list_len: 100_000,
        }
    }
}

impl CodecConfig {
    pub fn lenient() -> Self {
        Self {
            function_mode: FunctionMode::Lenient,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
