//! Scenes supplied by the editor and the (image, script) pairs derived
//! from them.
//!
//! A scene carries two script variants: the one recommended by the
//! script generator and the user's edited version. The edited script
//! always wins when it has content.

use serde::{Deserialize, Serialize};

/// One scene as supplied by the scene editor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub image_url: String,
    #[serde(default)]
    pub edited_script: Option<String>,
    #[serde(default)]
    pub recommended_script: Option<String>,
}

/// A single (image, script) unit of the rendered video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePair {
    pub image_url: String,
    pub script: String,
}

impl Scene {
    /// Create a scene with only a recommended script.
    pub fn new(image_url: impl Into<String>, recommended_script: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            edited_script: None,
            recommended_script: Some(recommended_script.into()),
        }
    }

    /// Attach a user-edited script.
    pub fn with_edited_script(mut self, script: impl Into<String>) -> Self {
        self.edited_script = Some(script.into());
        self
    }

    /// The script to render: the edited one if it has content, else the
    /// recommended one. Whitespace-only scripts count as absent.
    pub fn resolved_script(&self) -> Option<&str> {
        non_blank(self.edited_script.as_deref())
            .or_else(|| non_blank(self.recommended_script.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
