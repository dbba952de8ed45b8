//! Business Profile - static letterhead configuration
//!
//! Company identity, signatory and bank details printed on every document.
//! Never user data; loaded once from JSON and shared read-only.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::page::{PageError, PageGeometry};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid profile JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version '{0}' in profile")]
    InvalidVersion(String),

    #[error("Profile requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("Invalid page in profile: {0}")]
    Page(#[from] PageError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[serde(default = "default_profile_version")]
    pub profile_version: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    pub company_name: String,
    pub company_address: String,
    pub contact_line: String,
    #[serde(default = "default_currency_label")]
    pub currency_label: String,
    #[serde(default = "default_closing")]
    pub closing: String,
    pub signatory_name: String,
    #[serde(default)]
    pub signatory_phone: String,
    #[serde(default)]
    pub bank_details: Vec<String>,
    #[serde(default = "default_quotation_terms")]
    pub quotation_terms: Vec<String>,
    /// Page geometry the profile prefers; CLI/user overrides win.
    #[serde(default)]
    pub page: Option<PageGeometry>,
}

fn default_profile_version() -> String { "1.0.0".to_string() }
fn default_engine_min_version() -> String { crate::MIN_ENGINE_VERSION.to_string() }
fn default_currency_label() -> String { "Rs".to_string() }
fn default_closing() -> String { "Thanks and Regards".to_string() }

fn default_quotation_terms() -> Vec<String> {
    vec![
        "Transportation Charges extra".to_string(),
        "If Sample is required from our end, that will be charged extra".to_string(),
        "Packing Charges Extra".to_string(),
    ]
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            profile_version: default_profile_version(),
            engine_min_version: default_engine_min_version(),
            company_name: "M.S. ENTERPRISES".to_string(),
            company_address:
                "5B-Sanjay Memorial Indl. Estate Phase-1, Near YMCA Chowk, N.I.T. FARIDABAD."
                    .to_string(),
            contact_line: "TEL.NO-9811086746 | GSTIN:06AKQPM8903JIZN".to_string(),
            currency_label: default_currency_label(),
            closing: default_closing(),
            signatory_name: "Nasir Khan".to_string(),
            signatory_phone: "+91 9811086746".to_string(),
            bank_details: vec![
                "PUNJAB NATIONAL BANK, A/C".to_string(),
                "No. 0483050019340".to_string(),
                "IFSC- PUNB0048320".to_string(),
            ],
            quotation_terms: default_quotation_terms(),
            page: None,
        }
    }
}

impl BusinessProfile {
    /// Reads a profile file and checks it against this engine.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(content)?;
        profile.check_engine_version()?;
        if let Some(page) = &profile.page {
            page.validate()?;
        }
        Ok(profile)
    }

    pub fn check_engine_version(&self) -> Result<(), ProfileError> {
        let engine = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| ProfileError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let required = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| ProfileError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine < required {
            return Err(ProfileError::EngineVersionMismatch {
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_profile_gets_defaults() {
        let profile = BusinessProfile::from_json(
            r#"{
                "companyName": "Acme Fabrication",
                "companyAddress": "1 Forge Lane",
                "contactLine": "TEL 123",
                "signatoryName": "R. Smith"
            }"#,
        )
        .unwrap();
        assert_eq!(profile.currency_label, "Rs");
        assert_eq!(profile.closing, "Thanks and Regards");
        assert_eq!(profile.quotation_terms.len(), 3);
        assert!(profile.bank_details.is_empty());
        assert!(profile.page.is_none());
    }

    #[test]
    fn test_future_engine_rejected() {
        let err = BusinessProfile::from_json(
            r#"{
                "engineMinVersion": "99.0.0",
                "companyName": "A", "companyAddress": "B",
                "contactLine": "C", "signatoryName": "D"
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::EngineVersionMismatch { .. }));
    }

    #[test]
    fn test_profile_page_margin_checked_at_load() {
        let json = |margin: &str| {
            format!(
                r#"{{
                    "companyName": "A", "companyAddress": "B",
                    "contactLine": "C", "signatoryName": "D",
                    "page": {{"size": "letter", "marginInches": {margin}}}
                }}"#
            )
        };
        let err = BusinessProfile::from_json(&json("5")).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Page(PageError::MarginOutOfRange { .. })
        ));
        assert!(BusinessProfile::from_json(&json("0")).is_err());

        let profile = BusinessProfile::from_json(&json("0.75")).unwrap();
        assert_eq!(profile.page.map(|p| p.margin_inches), Some(0.75));
    }

    #[test]
    fn test_bad_version_string() {
        let profile = BusinessProfile {
            engine_min_version: "one".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            profile.check_engine_version(),
            Err(ProfileError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&BusinessProfile::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = BusinessProfile::load(file.path()).unwrap();
        assert_eq!(loaded, BusinessProfile::default());
    }
}
