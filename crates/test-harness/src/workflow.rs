//! InspectionBench: fluent API for scripting inspection sessions in tests.
//!
//! Clicks are simulated by casting rays straight down onto the fixture, so the
//! session sees the same hit points and face normals a host would report.
//! Features are addressed by name instead of UUID for readability.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use feature_kernel::{DetectionConfig, SurfaceHit, VertexBuffer};
use inspection::{DetectionOutcome, ExportRecord, FeatureKind, InspectionSession, OrientationFace, export_record_at};
use uuid::Uuid;

use crate::helpers::{HarnessError, click_from_above};
use crate::soup::TriangleSoup;
use crate::stl;

pub struct InspectionBench {
    pub session: InspectionSession<VertexBuffer>,
    soup: TriangleSoup,
    named: HashMap<String, Uuid>,
    history: Vec<(String, String)>,
}

impl InspectionBench {
    /// Load `soup` into a fresh session with the given configuration.
    pub fn new(soup: TriangleSoup, config: DetectionConfig) -> Result<Self, HarnessError> {
        let mut session = InspectionSession::new(config);
        session.load_mesh(soup.to_vertex_buffer()?);
        Ok(Self {
            session,
            soup,
            named: HashMap::new(),
            history: Vec::new(),
        })
    }

    /// Like [`Self::new`], but the mesh goes through a binary STL first.
    pub fn via_stl(soup: TriangleSoup, config: DetectionConfig) -> Result<Self, HarnessError> {
        let bytes = stl::export_binary_stl(&soup, "fixture")?;
        Self::new(stl::import_binary_stl(&bytes)?, config)
    }

    pub fn soup(&self) -> &TriangleSoup {
        &self.soup
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    /// UUID of a named feature.
    pub fn id(&self, name: &str) -> Result<Uuid, HarnessError> {
        self.named.get(name).copied().ok_or_else(|| HarnessError::AssertionFailed {
            detail: format!("no feature named {:?}", name),
        })
    }

    pub fn hit(&self, x: f64, y: f64) -> Result<SurfaceHit, HarnessError> {
        click_from_above(&self.soup, x, y)
    }

    /// Click at `(x, y)` in hole mode.
    pub fn click_hole(&mut self, name: &str, x: f64, y: f64) -> Result<DetectionOutcome, HarnessError> {
        let hit = self.hit(x, y)?;
        let outcome = self.session.detect_hole(hit)?;
        self.record(name, outcome, FeatureKind::Hole);
        Ok(outcome)
    }

    /// Click at `(x, y)` in face mode.
    pub fn click_face(&mut self, name: &str, x: f64, y: f64) -> Result<DetectionOutcome, HarnessError> {
        let hit = self.hit(x, y)?;
        let outcome = self.session.detect_footprint(&self.soup, hit)?;
        self.record(name, outcome, FeatureKind::Footprint);
        Ok(outcome)
    }

    /// Click at `(x, y)` in orientation mode.
    pub fn set_orientation(&mut self, x: f64, y: f64) -> Result<OrientationFace, HarnessError> {
        let hit = self.hit(x, y)?;
        let face = self.session.set_orientation_face(hit)?;
        self.history
            .push(("orientation".to_string(), format!("({:.2}, {:.2})", x, y)));
        Ok(face)
    }

    /// Delete a named hole or footprint.
    pub fn delete(&mut self, name: &str) -> Result<(), HarnessError> {
        let id = self.id(name)?;
        if self.session.holes().iter().any(|h| h.id == id) {
            self.session.delete_hole(id)?;
        } else {
            self.session.delete_footprint(id)?;
        }
        self.named.remove(name);
        self.history.push((name.to_string(), "deleted".to_string()));
        Ok(())
    }

    pub fn export_at(&self, at: DateTime<Utc>) -> Result<ExportRecord, HarnessError> {
        Ok(export_record_at(&self.session, at)?)
    }

    fn record(&mut self, name: &str, outcome: DetectionOutcome, kind: FeatureKind) {
        if let DetectionOutcome::Detected { id } = outcome {
            self.named.insert(name.to_string(), id);
        }
        self.history
            .push((name.to_string(), outcome.status_message(kind).to_string()));
    }
}
