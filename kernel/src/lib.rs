// Feedlake Kernel
//
// Versioned reads of the bronze table and generation of the source
// feeds that get ingested into it.

pub mod adapters;
pub mod config;
pub mod fixture;
pub mod ingest;
pub mod version_log;
pub mod read;
pub mod resolve;
