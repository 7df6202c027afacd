use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a script by whether addresses can be derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptKind {
    /// Resolves to exactly one address
    StandardSingleSig,
    /// Resolves to one address per key, with a signature threshold
    StandardMultiSig,
    /// No address can be derived
    NonStandard,
}

impl ScriptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::StandardSingleSig => "standard_single_sig",
            ScriptKind::StandardMultiSig => "standard_multi_sig",
            ScriptKind::NonStandard => "non_standard",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
