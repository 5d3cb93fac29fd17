pub mod field_data_service;
pub mod sync_orchestrator;

pub use field_data_service::FieldDataService;
pub use sync_orchestrator::SyncOrchestrator;
