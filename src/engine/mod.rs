// ==========================================
// StitchAdmin - Engine-Schicht
// ==========================================
// Geschäftsregeln: Statusmaschine, Planung,
// DST-Analyse, Verbrauchsschätzung, Kaskaden.
// ==========================================

pub mod document_cascade;
pub mod dst_analyzer;
pub mod error;
pub mod packing_flow;
pub mod scheduler;
pub mod thread_estimator;
pub mod workflow;

pub use document_cascade::{CascadeOutcome, DocumentCascade};
pub use dst_analyzer::{analyze_dst_bytes, analyze_dst_file, DstAnalysis};
pub use error::{EngineError, EngineResult};
pub use packing_flow::{PackageDetails, PackingFlowEngine};
pub use scheduler::Scheduler;
pub use thread_estimator::{ThreadEstimate, ThreadEstimator};
pub use workflow::{TransitionContext, WorkflowEngine};
