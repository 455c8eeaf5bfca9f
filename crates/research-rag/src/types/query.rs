//! Request bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

/// POST /ask body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,
    /// Restrict retrieval to one document
    #[serde(default)]
    pub document_id: Option<i64>,
}

/// POST /compare_documents body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareRequest {
    /// Documents to compare (at least two)
    #[serde(default)]
    pub document_ids: Vec<i64>,
    /// similarities | differences | themes
    #[serde(default, rename = "type")]
    pub comparison_type: Option<String>,
}

impl CompareRequest {
    /// Requested ids with duplicates removed, first occurrence wins
    pub fn unique_ids(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.document_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Parsed comparison mode
    pub fn mode(&self) -> ComparisonMode {
        self.comparison_type
            .as_deref()
            .map(ComparisonMode::parse)
            .unwrap_or_default()
    }
}

/// What a comparison should focus on
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    #[default]
    Similarities,
    Differences,
    Themes,
}

impl ComparisonMode {
    /// Parse a mode name; anything unrecognised is treated as `Themes`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "similarities" => Self::Similarities,
            "differences" => Self::Differences,
            _ => Self::Themes,
        }
    }

    /// Instruction phrase used in the comparison prompt
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Similarities => {
                "identify key similarities, common themes, and shared concepts between"
            }
            Self::Differences => {
                "identify key differences, contrasting viewpoints, and unique aspects of"
            }
            Self::Themes => "extract and analyze the main themes across",
        }
    }
}

/// POST /search_documents body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_request_defaults() {
        let req: CompareRequest = serde_json::from_str(r#"{"document_ids": [3, 1, 3]}"#).unwrap();
        assert_eq!(req.unique_ids(), vec![3, 1]);
        assert_eq!(req.mode(), ComparisonMode::Similarities);
    }

    #[test]
    fn test_compare_mode_parsing() {
        let req: CompareRequest =
            serde_json::from_str(r#"{"document_ids": [1, 2], "type": "Differences"}"#).unwrap();
        assert_eq!(req.mode(), ComparisonMode::Differences);
        assert_eq!(ComparisonMode::parse("whatever"), ComparisonMode::Themes);
    }

    #[test]
    fn test_ask_request_missing_fields() {
        let req: AskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.question.is_empty());
        assert!(req.document_id.is_none());
    }
}
