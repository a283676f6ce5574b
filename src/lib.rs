// ============================================================================
// couchmock Library
// ============================================================================

pub mod core;
pub mod topology;
pub mod bucket;
pub mod config;
pub mod cluster;
pub mod web;

// Re-export main types for convenience
pub use core::{MockError, Result};
pub use topology::{NodeDescriptor, Topology, VBucketOwner};
pub use bucket::{Bucket, BucketRegistry};
pub use config::BucketConfig;
pub use cluster::{ClusterConfig, MockCluster};
pub use web::{NullViewEngine, ViewEngine, ViewOperation, ViewRequest, ViewsError};
