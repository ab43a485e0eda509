pub mod batch_exporter;
pub mod orchestrator;
