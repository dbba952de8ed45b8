//! Page Geometry
//!
//! Where page size and margins come from, so backends never guess.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("Margin must be greater than 0 and at most {max} inches, got {got}")]
    MarginOutOfRange { got: f32, max: f32 },

    #[error("Unknown page size '{0}', expected letter or a4")]
    UnknownSize(String),
}

/// Who decided the geometry in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeometryAuthority {
    /// Built-in defaults
    #[default]
    System,
    /// Business profile file
    Profile,
    /// Caller override (validated)
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (215.9, 279.4),
            PageSize::A4 => (210.0, 297.0),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            other => Err(PageError::UnknownSize(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    #[serde(default)]
    pub authority: GeometryAuthority,
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "default_margin")]
    pub margin_inches: f32,
}

fn default_margin() -> f32 { 1.0 }

const MAX_MARGIN_INCHES: f32 = 3.0;

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            authority: GeometryAuthority::System,
            size: PageSize::Letter,
            margin_inches: default_margin(),
        }
    }
}

impl PageGeometry {
    /// Margins from a loaded profile were already checked by `BusinessProfile::from_json`.
    pub fn from_profile(size: PageSize, margin_inches: f32) -> Self {
        Self {
            authority: GeometryAuthority::Profile,
            size,
            margin_inches,
        }
    }

    /// Caller override; margins must leave a printable area.
    pub fn from_user(size: PageSize, margin_inches: f32) -> Result<Self, PageError> {
        let geometry = Self {
            authority: GeometryAuthority::User,
            size,
            margin_inches,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Margin must be positive and at most three inches.
    pub fn validate(&self) -> Result<(), PageError> {
        if !(self.margin_inches > 0.0 && self.margin_inches <= MAX_MARGIN_INCHES) {
            return Err(PageError::MarginOutOfRange {
                got: self.margin_inches,
                max: MAX_MARGIN_INCHES,
            });
        }
        Ok(())
    }

    pub fn margin_mm(&self) -> f32 {
        self.margin_inches * MM_PER_INCH
    }

    pub fn content_width_mm(&self) -> f32 {
        self.size.dimensions_mm().0 - 2.0 * self.margin_mm()
    }
}
