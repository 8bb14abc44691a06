use serde::{Deserialize, Serialize};

/// One of the three derived renditions stored for every photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Original,
    Medium,
    Thumbnail,
}

/// How a variant is fitted into its target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale down to fit inside the box, keeping the aspect ratio. Never upscales.
    Contain,
    /// Scale and center-crop to exactly fill the box.
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPolicy {
    pub width: u32,
    pub height: u32,
    pub fit: Fit,
    pub quality: u8,
}

impl Variant {
    /// Upload order.
    pub const ALL: [Variant; 3] = [Variant::Original, Variant::Medium, Variant::Thumbnail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::Medium => "medium",
            Variant::Thumbnail => "thumbnail",
        }
    }

    /// Resolves a requested size name; unknown names fall back to medium.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "original" => Variant::Original,
            "thumbnail" => Variant::Thumbnail,
            _ => Variant::Medium,
        }
    }

    pub fn policy(&self) -> VariantPolicy {
        match self {
            Variant::Original => VariantPolicy {
                width: 1920,
                height: 1080,
                fit: Fit::Contain,
                quality: 90,
            },
            Variant::Medium => VariantPolicy {
                width: 800,
                height: 600,
                fit: Fit::Contain,
                quality: 85,
            },
            Variant::Thumbnail => VariantPolicy {
                width: 200,
                height: 200,
                fit: Fit::Cover,
                quality: 80,
            },
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
