use serde::Deserialize;

/// Contact form submission; transient, never persisted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub service: Option<String>,
}
