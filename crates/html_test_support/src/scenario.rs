//! TOML scenario fixtures: a page location, batches of user messages the
//! host renders, and the projections expected afterwards.
//!
//! ```toml
//! name = "three prompts"
//! url = "https://chatgpt.com/c/abc"
//! batches = [["hello", "goodbye world", "HELLO again"]]
//!
//! [[query]]
//! text = "hello"
//! expect = [1, 3]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub batches: Vec<Vec<String>>,
    #[serde(default, rename = "query")]
    pub queries: Vec<QueryCase>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QueryCase {
    pub text: String,
    /// Sequence numbers, in order.
    pub expect: Vec<u32>,
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Scenario {
        let content = fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("failed to read scenario {path:?}: {err}"));
        Self::from_toml_str(&content)
            .unwrap_or_else(|err| panic!("invalid scenario {path:?}: {err}"))
    }

    /// Every `*.toml` scenario in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Vec<Scenario> {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .unwrap_or_else(|err| panic!("failed to list {dir:?}: {err}"))
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();
        paths.iter().map(|p| Scenario::load(p)).collect()
    }

    pub fn message_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}
