use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub branding: Branding,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-tenant theme. The six colors are required hex values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub muted_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            primary_color: "#2F6B3A".to_string(),
            secondary_color: "#F2C14E".to_string(),
            accent_color: "#E36414".to_string(),
            background_color: "#FFFDF7".to_string(),
            text_color: "#1F2933".to_string(),
            muted_color: "#7B8794".to_string(),
            logo_url: None,
            background_image_url: None,
            font_family: None,
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    let digits = match value.strip_prefix('#') {
        Some(d) => d,
        None => return false,
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl Branding {
    /// Field errors keyed by `branding.<field>`; empty when valid.
    pub fn validate(&self) -> HashMap<String, String> {
        let colors = [
            ("primary_color", &self.primary_color),
            ("secondary_color", &self.secondary_color),
            ("accent_color", &self.accent_color),
            ("background_color", &self.background_color),
            ("text_color", &self.text_color),
            ("muted_color", &self.muted_color),
        ];
        let mut errors = HashMap::new();
        for (field, value) in colors {
            if !is_hex_color(value) {
                errors.insert(format!("branding.{}", field), format!("'{}' is not a hex color", value));
            }
        }
        for (field, value) in [("logo_url", &self.logo_url), ("background_image_url", &self.background_image_url)] {
            if let Some(value) = value {
                if url::Url::parse(value).is_err() {
                    errors.insert(format!("branding.{}", field), "must be an absolute URL".to_string());
                }
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub branding: Branding,
}
