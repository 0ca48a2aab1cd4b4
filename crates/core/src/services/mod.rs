pub mod aggregator_service;
pub mod goal_service;
pub mod ingestion_service;
pub mod ledger_service;
