//! Avatar catalog.
//!
//! The catalog is a lookup table of selectable avatars. A built-in table
//! mirrors the avatars the product launched with; deployments can replace it
//! with a JSON document of the same shape. Entries are immutable once loaded.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Object-storage prefix for the built-in reference videos.
const BUILTIN_VIDEO_BASE: &str = "https://vegasongs.s3.ap-southeast-1.amazonaws.com/videos";

/// A selectable avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarOption {
    /// Catalog-assigned id, unique within one catalog.
    pub id: u32,
    /// Image shown in the avatar picker.
    pub display_image: String,
    /// Human-readable name.
    pub display_name: String,
    /// Pre-recorded face video the vendor lip-syncs onto.
    #[serde(default)]
    pub reference_video_uri: Option<String>,
    /// Synthesized voice used to speak the script.
    #[serde(default)]
    pub voice_id: Option<String>,
}

impl AvatarOption {
    /// Whether this avatar carries everything a generation request needs.
    pub fn is_generation_ready(&self) -> bool {
        self.reference_video_uri.is_some() && self.voice_id.is_some()
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    avatars: Vec<AvatarOption>,
}

/// An ordered, validated set of avatars.
#[derive(Debug, Clone)]
pub struct Catalog {
    avatars: Vec<AvatarOption>,
}

impl Catalog {
    /// Build a catalog from a list of avatars.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateId` if two entries share an id.
    pub fn new(avatars: Vec<AvatarOption>) -> Result<Self, CatalogError> {
        if avatars.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(avatars.len());
        for avatar in &avatars {
            if !seen.insert(avatar.id) {
                return Err(CatalogError::DuplicateId { id: avatar.id });
            }
        }

        Ok(Self { avatars })
    }

    /// The avatars the product ships with.
    ///
    /// The third avatar has no reference video or voice and cannot complete
    /// a generation.
    pub fn builtin() -> Self {
        Self {
            avatars: vec![
                AvatarOption {
                    id: 1,
                    display_image: "/avatars/avatar1.jpg".to_owned(),
                    display_name: "Avatar 1".to_owned(),
                    reference_video_uri: Some(format!("{BUILTIN_VIDEO_BASE}/avatar1.mp4")),
                    voice_id: Some("alloy".to_owned()),
                },
                AvatarOption {
                    id: 2,
                    display_image: "/avatars/avatar2.jpg".to_owned(),
                    display_name: "Avatar 2".to_owned(),
                    reference_video_uri: Some(format!("{BUILTIN_VIDEO_BASE}/avatar2.mp4")),
                    voice_id: Some("nova".to_owned()),
                },
                AvatarOption {
                    id: 3,
                    display_image: "/avatars/avatar3.jpg".to_owned(),
                    display_name: "Avatar 3".to_owned(),
                    reference_video_uri: None,
                    voice_id: None,
                },
            ],
        }
    }

    /// Parse a catalog from a JSON document of the form
    /// `{ "avatars": [ { "id": 1, "display_image": ..., ... } ] }`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` on malformed JSON, or any validation
    /// error from [`Catalog::new`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::new(doc.avatars)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any error
    /// from [`Catalog::from_json`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), avatars = catalog.len(), "avatar catalog loaded");
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise fall back to the built-in table.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Catalog::load`].
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Look up an avatar by id.
    pub fn get(&self, id: u32) -> Option<&AvatarOption> {
        self.avatars.iter().find(|a| a.id == id)
    }

    /// All avatars in display order.
    pub fn avatars(&self) -> &[AvatarOption] {
        &self.avatars
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}
