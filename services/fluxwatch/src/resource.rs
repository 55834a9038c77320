//! Resource model shared by the store, the view and the onboarding form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// What kind of target a resource is
///
/// Unknown values coming from the backend are kept verbatim in `Other`
/// so a newer backend never breaks decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    #[default]
    Website,
    Api,
    Server,
    Database,
    Service,
    Other(String),
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Website,
        ResourceType::Api,
        ResourceType::Server,
        ResourceType::Database,
        ResourceType::Service,
    ];

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Website => "website",
            ResourceType::Api => "api",
            ResourceType::Server => "server",
            ResourceType::Database => "database",
            ResourceType::Service => "service",
            ResourceType::Other(raw) => raw,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &str {
        match self {
            ResourceType::Website => "Website",
            ResourceType::Api => "API",
            ResourceType::Server => "Server",
            ResourceType::Database => "Database",
            ResourceType::Service => "Service",
            ResourceType::Other(raw) => raw,
        }
    }

    /// Icon name; unknown types fall back to the generic `activity` icon
    pub fn icon(&self) -> &'static str {
        match self {
            ResourceType::Website => "globe",
            ResourceType::Api => "link",
            ResourceType::Server => "server",
            ResourceType::Database => "database",
            ResourceType::Service | ResourceType::Other(_) => "activity",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ResourceType::Other(_))
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "website" => ResourceType::Website,
            "api" => ResourceType::Api,
            "server" => ResourceType::Server,
            "database" => ResourceType::Database,
            "service" => ResourceType::Service,
            _ => ResourceType::Other(value),
        }
    }
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        ResourceType::from(value.to_string())
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe region of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    #[default]
    Auto,
    UsEast,
    EuWest,
    ApSouth,
    Other(String),
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Auto, Region::UsEast, Region::EuWest, Region::ApSouth];

    pub fn as_str(&self) -> &str {
        match self {
            Region::Auto => "auto",
            Region::UsEast => "us-east",
            Region::EuWest => "eu-west",
            Region::ApSouth => "ap-south",
            Region::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Region::Auto => "Auto",
            Region::UsEast => "US East",
            Region::EuWest => "EU West",
            Region::ApSouth => "AP South",
            Region::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Region::Other(_))
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        match value.as_str() {
            "auto" => Region::Auto,
            "us-east" => Region::UsEast,
            "eu-west" => Region::EuWest,
            "ap-south" => Region::ApSouth,
            _ => Region::Other(value),
        }
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Region::from(value.to_string())
    }
}

impl From<Region> for String {
    fn from(value: Region) -> Self {
        match value {
            Region::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored target as reported by the backend
///
/// Decoding is lenient: missing or `null` fields become empty, scalars of
/// any JSON type are read as text, and the id may arrive as `id` or `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_text")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_tag"
    )]
    pub kind: Option<ResourceType>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub url: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_tag"
    )]
    pub region: Option<Region>,
}

impl Resource {
    /// First 8 characters of the id, used as a compact tag
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }

    /// Region to display; a resource without one is shown as `auto`
    pub fn display_region(&self) -> Region {
        self.region.clone().unwrap_or_default()
    }

    /// Field values searched by the filter, skipping absent or empty ones
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.name.as_str()),
            self.kind.as_ref().map(ResourceType::as_str),
            self.region.as_ref().map(Region::as_str),
            Some(self.url.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
    }
}

/// Text of any JSON value; `null` has none
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_text(value).unwrap_or_default())
}

fn deserialize_tag<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_text(value).map(T::from))
}

/// Unsaved create-form state: a resource without an id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    pub region: Region,
}

/// Form controls of the create form, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Type,
    Url,
    Region,
}

impl FromStr for DraftField {
    type Err = crate::FluxwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(DraftField::Name),
            "type" => Ok(DraftField::Type),
            "url" => Ok(DraftField::Url),
            "region" => Ok(DraftField::Region),
            other => Err(crate::FluxwatchError::InvalidDraft(format!(
                "unknown field {:?}",
                other
            ))),
        }
    }
}

impl Draft {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ResourceType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Apply one form control's text value
    pub fn set(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Name => self.name = value.to_string(),
            DraftField::Type => self.kind = ResourceType::from(value),
            DraftField::Url => self.url = value.to_string(),
            DraftField::Region => self.region = Region::from(value),
        }
    }

    /// Back to the empty defaults shown on mount
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Name and url are required
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::FluxwatchError::InvalidDraft(
                "name is required".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(crate::FluxwatchError::InvalidDraft(
                "url is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `resource` carries exactly what this draft submitted
    pub fn matches(&self, resource: &Resource) -> bool {
        resource.name == self.name
            && resource.url == self.url
            && resource.kind.clone().unwrap_or_default() == self.kind
            && resource.display_region() == self.region
    }

    pub fn to_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
