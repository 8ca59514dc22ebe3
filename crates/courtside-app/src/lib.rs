// Courtside collaborator layer: CSV ingestion, JSON snapshot storage and
// the pipelines that chain them through the scoring engine.

pub mod ingest;
pub mod pipeline;
pub mod store;
