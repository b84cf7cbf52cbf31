//! Inspection session on top of the feature kernel.
//!
//! Holds the holes and face footprints found on a loaded part, the chosen
//! orientation face, and produces the rounded export record consumed by
//! downstream tooling.

pub mod errors;
pub mod export;
pub mod session;

pub use errors::{ExportError, SessionError};
pub use export::{
    ExportAlignedDistance, ExportFace, ExportFaceDistance, ExportHole, ExportOrientation, ExportRecord,
    ExportSlideFace, ExportSlideGroup, export_file_name, export_json, export_record, export_record_at, parse_export,
    round2,
};
pub use session::{
    DetectionOutcome, FeatureKind, FootprintFace, FootprintRecord, HoleFace, HoleRecord, InspectionSession,
    OrientationFace,
};
