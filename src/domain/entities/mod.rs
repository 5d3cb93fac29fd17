pub mod photo;
pub mod plot;
pub mod project;
pub mod queued_operation;
pub mod sync_report;
pub mod tree;

pub use photo::{NewPhoto, TreePhoto};
pub use plot::{NewPlot, PlotShape, PlotStatus, PlotUpdate, SamplePlot};
pub use project::{FieldProject, ProjectStatus};
pub use queued_operation::{OperationDraft, QueuedOperation};
pub use sync_report::{
    PassOutcome, SkipReason, SyncPhase, SyncReport, SyncSnapshot, SyncTrigger,
};
pub use tree::{HealthStatus, NewTree, TreeMeasurement, TreeUpdate};
