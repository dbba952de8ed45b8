//! Document Pipeline - Single Entry Point for generation
//!
//! classify -> assemble -> render -> manifest. Output files are named by a
//! fresh UUID per call, so concurrent generations never share a path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::assembler::assemble_with_profile;
use crate::classifier::{document_mode, Mode};
use crate::document::Document;
use crate::hashing::{compute_form_hash, sha256_hex};
use crate::page::PageGeometry;
use crate::profile::{BusinessProfile, ProfileError};
use crate::record::FormRecord;
use crate::render::{PdfRenderer, RenderBackend, RenderError};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Manifest describing one generated document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub id: String,
    pub mode: Mode,
    pub filename: String,
    pub media_type: String,
    pub backend: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub form_hash: String,
    pub document_hash: String,
    pub size_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub manifest: GeneratedDocument,
    pub bytes: Vec<u8>,
}

pub struct DocumentPipeline {
    profile: BusinessProfile,
    geometry: PageGeometry,
    backend: Box<dyn RenderBackend>,
}

impl DocumentPipeline {
    /// Page geometry comes from the profile when it names one.
    pub fn new(profile: BusinessProfile, backend: Box<dyn RenderBackend>) -> Self {
        let geometry = profile
            .page
            .map(|page| PageGeometry::from_profile(page.size, page.margin_inches))
            .unwrap_or_default();
        Self {
            profile,
            geometry,
            backend,
        }
    }

    /// Loads the business profile from a JSON file.
    pub fn from_profile_file(path: &Path, backend: Box<dyn RenderBackend>) -> Result<Self, PipelineError> {
        Ok(Self::new(BusinessProfile::load(path)?, backend))
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn mode(&self, form: &FormRecord) -> Mode {
        document_mode(form)
    }

    pub fn assemble(&self, form: &FormRecord) -> Document {
        assemble_with_profile(form, &self.profile)
    }

    /// Renders in memory.
    #[tracing::instrument(skip_all, fields(backend = self.backend.name()))]
    pub fn generate(&self, form: &FormRecord) -> Result<RenderedDocument, PipelineError> {
        let document = self.assemble(form);
        let bytes = self.backend.render(&document, &self.geometry)?;

        let id = Uuid::new_v4().to_string();
        let manifest = GeneratedDocument {
            filename: format!("{}.{}", id, self.backend.extension()),
            id,
            mode: document.mode,
            media_type: self.backend.media_type().to_string(),
            backend: self.backend.name().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            form_hash: compute_form_hash(form)?,
            document_hash: sha256_hex(&bytes),
            size_bytes: bytes.len(),
            path: None,
        };
        info!(id = %manifest.id, mode = %manifest.mode, size = manifest.size_bytes, "document generated");

        Ok(RenderedDocument { manifest, bytes })
    }

    /// Renders and writes `<id>.<ext>` into `dir`, creating it if needed.
    /// Never overwrites an existing file.
    pub fn generate_to_dir(&self, form: &FormRecord, dir: &Path) -> Result<GeneratedDocument, PipelineError> {
        let RenderedDocument { mut manifest, bytes } = self.generate(form)?;

        fs::create_dir_all(dir)?;
        let path = dir.join(&manifest.filename);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(&bytes)?;

        info!(path = %path.display(), "document written");
        manifest.path = Some(path);
        Ok(manifest)
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(BusinessProfile::default(), Box::new(PdfRenderer))
    }
}
