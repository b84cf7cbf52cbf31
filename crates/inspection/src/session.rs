//! The inspection session: everything found so far on one loaded part.
//!
//! The geometry kernel is stateless; the session owns the feature lists, the
//! orientation face and the random source, and is passed explicitly to every
//! operation. It is single-threaded: each call runs to completion before the
//! next one starts.

use feature_kernel::distance::{PairDistance, aligned_distances, footprint_distances, pairwise_distances};
use feature_kernel::fitting::fit_rng;
use feature_kernel::grouping::{find_coplanar_group, group_circles, group_footprints, is_coplanar};
use feature_kernel::{
    AlignedDistance, Circle, DetectionConfig, EulerAngles, FaceFootprint, MeshSource, PlaneExtent, SurfaceHit,
    SurfaceProbe, Vec3, VertexBuffer, detect_circle_with_rng, flood_fill_footprint, plane_extent, rotation_degrees,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::SessionError;

/// A detected hole kept by the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleRecord {
    pub id: Uuid,
    pub circle: Circle,
}

/// A measured face footprint kept by the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintRecord {
    pub id: Uuid,
    pub footprint: FaceFootprint,
}

/// The face chosen as the part's canonical "top".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationFace {
    pub normal: Vec3,
    pub anchor: Vec3,
    /// Euler X-Y-Z rotation of the face frame, in degrees.
    pub rotation: EulerAngles,
    /// Padded extent of the mesh vertices on the face plane.
    pub extent: Option<PlaneExtent>,
}

/// What kind of feature a detection was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Hole,
    Footprint,
}

/// Result of a detection request. None of these is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// A new feature was recorded.
    Detected { id: Uuid },
    /// The feature matches one already recorded.
    Duplicate { existing: Uuid },
    /// Nothing was found at this location.
    NotDetected,
}

impl DetectionOutcome {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            DetectionOutcome::Detected { id } => Some(*id),
            _ => None,
        }
    }

    /// Neutral status line for display.
    pub fn status_message(&self, kind: FeatureKind) -> &'static str {
        match (kind, self) {
            (FeatureKind::Hole, DetectionOutcome::Detected { .. }) => "Circle detected",
            (FeatureKind::Hole, DetectionOutcome::Duplicate { .. }) => "Circle already detected in this location",
            (FeatureKind::Hole, DetectionOutcome::NotDetected) => "No circle detected at this location",
            (FeatureKind::Footprint, DetectionOutcome::Detected { .. }) => "Face detected",
            (FeatureKind::Footprint, DetectionOutcome::Duplicate { .. }) => "Face already detected in this location",
            (FeatureKind::Footprint, DetectionOutcome::NotDetected) => "No face detected at this location",
        }
    }
}

/// Holes sharing one face, in display order, with their aligned spacings.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleFace {
    pub normal: Vec3,
    pub holes: Vec<HoleRecord>,
    /// `from`/`to` are positions in `holes`.
    pub aligned: Vec<AlignedDistance>,
}

/// Footprints sharing one plane, with their edge separations.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintFace {
    pub normal: Vec3,
    pub footprints: Vec<FootprintRecord>,
    /// `from`/`to` are positions in `footprints`.
    pub distances: Vec<PairDistance>,
}

/// Session state for inspecting one part.
pub struct InspectionSession<M: MeshSource = VertexBuffer> {
    config: DetectionConfig,
    mesh: Option<M>,
    holes: Vec<HoleRecord>,
    footprints: Vec<FootprintRecord>,
    orientation: Option<OrientationFace>,
    rng: StdRng,
}

impl<M: MeshSource> Default for InspectionSession<M> {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl<M: MeshSource> InspectionSession<M> {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            rng: fit_rng(&config.circle),
            config,
            mesh: None,
            holes: Vec::new(),
            footprints: Vec::new(),
            orientation: None,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Replace the configuration, restarting the random source from its seed.
    pub fn set_config(&mut self, config: DetectionConfig) {
        self.rng = fit_rng(&config.circle);
        self.config = config;
    }

    /// Load a part, discarding everything recorded on the previous one.
    pub fn load_mesh(&mut self, mesh: M) {
        info!(vertices = mesh.vertex_count(), "mesh loaded");
        self.mesh = Some(mesh);
        self.clear_all();
    }

    pub fn unload_mesh(&mut self) -> Option<M> {
        self.mesh.take()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn mesh(&self) -> Result<&M, SessionError> {
        self.mesh.as_ref().ok_or(SessionError::NoMesh)
    }

    pub fn holes(&self) -> &[HoleRecord] {
        &self.holes
    }

    pub fn footprints(&self) -> &[FootprintRecord] {
        &self.footprints
    }

    pub fn orientation_face(&self) -> Option<&OrientationFace> {
        self.orientation.as_ref()
    }

    /// Look for a hole around a surface hit and record it unless a hole
    /// already sits within the duplicate distance.
    #[instrument(skip(self))]
    pub fn detect_hole(&mut self, hit: SurfaceHit) -> Result<DetectionOutcome, SessionError> {
        let mesh = self.mesh.as_ref().ok_or(SessionError::NoMesh)?;
        let Some(circle) = detect_circle_with_rng(mesh, hit, &self.config, &mut self.rng) else {
            return Ok(DetectionOutcome::NotDetected);
        };

        let limit = self.config.session.duplicate_distance;
        if let Some(existing) = self
            .holes
            .iter()
            .find(|h| h.circle.center.distance_to(&circle.center) < limit)
        {
            info!(existing = %existing.id, "circle already recorded");
            return Ok(DetectionOutcome::Duplicate { existing: existing.id });
        }

        let id = Uuid::new_v4();
        self.holes.push(HoleRecord { id, circle });
        info!(%id, total = self.holes.len(), "hole recorded");
        Ok(DetectionOutcome::Detected { id })
    }

    /// Measure the flat face under a surface hit by probing the surface, and
    /// record it unless the hit already lies inside a recorded footprint.
    #[instrument(skip(self, probe))]
    pub fn detect_footprint<P: SurfaceProbe + ?Sized>(
        &mut self,
        probe: &P,
        hit: SurfaceHit,
    ) -> Result<DetectionOutcome, SessionError> {
        self.mesh()?;

        let margin = self.config.flood_fill.grid_step;
        if let Some(existing) = self.footprints.iter().find(|r| {
            let fp = &r.footprint;
            is_coplanar(fp, &hit, &self.config.grouping)
                && fp.bounds.contains(fp.basis().project(fp.anchor, hit.point), margin)
        }) {
            info!(existing = %existing.id, "footprint already recorded");
            return Ok(DetectionOutcome::Duplicate { existing: existing.id });
        }

        let Some(footprint) = flood_fill_footprint(probe, hit.point, hit.normal, &self.config.flood_fill) else {
            return Ok(DetectionOutcome::NotDetected);
        };

        let id = Uuid::new_v4();
        self.footprints.push(FootprintRecord { id, footprint });
        info!(%id, total = self.footprints.len(), "footprint recorded");
        Ok(DetectionOutcome::Detected { id })
    }

    /// Padded extent of the face plane under a hit, for hover previews.
    pub fn preview_face_extent(&self, hit: SurfaceHit) -> Result<Option<PlaneExtent>, SessionError> {
        let mesh = self.mesh()?;
        let tol = &self.config.session;
        Ok(plane_extent(mesh, hit.point, hit.normal, tol.extent_tolerance, tol.preview_padding))
    }

    /// Record the face under a hit as the orientation face.
    #[instrument(skip(self))]
    pub fn set_orientation_face(&mut self, hit: SurfaceHit) -> Result<OrientationFace, SessionError> {
        let mesh = self.mesh()?;
        let tol = &self.config.session;
        let normal = hit.normal.normalized().unwrap_or(Vec3::Z);
        let face = OrientationFace {
            normal,
            anchor: hit.point,
            rotation: rotation_degrees(normal),
            extent: plane_extent(mesh, hit.point, normal, tol.extent_tolerance, tol.extent_padding),
        };
        info!(
            rx = face.rotation.x,
            ry = face.rotation.y,
            rz = face.rotation.z,
            "orientation face set"
        );
        self.orientation = Some(face);
        Ok(face)
    }

    pub fn clear_orientation_face(&mut self) {
        self.orientation = None;
    }

    pub fn delete_hole(&mut self, id: Uuid) -> Result<HoleRecord, SessionError> {
        let pos = self
            .holes
            .iter()
            .position(|h| h.id == id)
            .ok_or(SessionError::HoleNotFound { id })?;
        Ok(self.holes.remove(pos))
    }

    pub fn delete_footprint(&mut self, id: Uuid) -> Result<FootprintRecord, SessionError> {
        let pos = self
            .footprints
            .iter()
            .position(|f| f.id == id)
            .ok_or(SessionError::FootprintNotFound { id })?;
        Ok(self.footprints.remove(pos))
    }

    pub fn clear_holes(&mut self) {
        self.holes.clear();
    }

    pub fn clear_footprints(&mut self) {
        self.footprints.clear();
    }

    pub fn clear_all(&mut self) {
        self.holes.clear();
        self.footprints.clear();
        self.orientation = None;
    }

    /// Holes grouped by face, each with its axis-aligned spacings.
    pub fn hole_faces(&self) -> Vec<HoleFace> {
        let circles: Vec<Circle> = self.holes.iter().map(|h| h.circle).collect();
        group_circles(&circles, &self.config.grouping)
            .into_iter()
            .map(|group| {
                let holes: Vec<HoleRecord> = group.members.iter().map(|&i| self.holes[i]).collect();
                let centers: Vec<Vec3> = holes.iter().map(|h| h.circle.center).collect();
                HoleFace {
                    normal: group.normal,
                    aligned: aligned_distances(&centers, self.config.alignment.tolerance),
                    holes,
                }
            })
            .collect()
    }

    /// Footprints grouped by plane, each with pairwise edge separations.
    pub fn footprint_faces(&self) -> Vec<FootprintFace> {
        let fps: Vec<FaceFootprint> = self.footprints.iter().map(|r| r.footprint).collect();
        group_footprints(&fps, &self.config.grouping)
            .into_iter()
            .map(|group| {
                let records: Vec<FootprintRecord> = group.members.iter().map(|&i| self.footprints[i]).collect();
                let members: Vec<FaceFootprint> = records.iter().map(|r| r.footprint).collect();
                FootprintFace {
                    normal: group.normal,
                    distances: footprint_distances(&members),
                    footprints: records,
                }
            })
            .collect()
    }

    /// Euclidean distance between every pair of recorded hole centers.
    pub fn hole_distances(&self) -> Vec<PairDistance> {
        let centers: Vec<Vec3> = self.holes.iter().map(|h| h.circle.center).collect();
        pairwise_distances(&centers)
    }

    /// Position in [`Self::hole_faces`] of the face lying on the orientation
    /// face, if any.
    pub fn orientation_group_index(&self) -> Option<usize> {
        let face = self.orientation.as_ref()?;
        let circles: Vec<Circle> = self.holes.iter().map(|h| h.circle).collect();
        let groups = group_circles(&circles, &self.config.grouping);
        let hit = SurfaceHit::new(face.anchor, face.normal);
        find_coplanar_group(&groups, &circles, &hit, &self.config.grouping)
    }
}
