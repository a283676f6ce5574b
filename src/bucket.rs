//! Buckets and the process-wide bucket registry
//!
//! The registry is an explicit value owned by the mock cluster and passed
//! into the web router at construction; it lives exactly as long as the
//! cluster does.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::{MockError, Result};
use crate::topology::{NodeDescriptor, Topology, VBucketOwner};

/// A provisioned bucket: identity plus its partition topology.
#[derive(Debug)]
pub struct Bucket {
    name: String,
    pool: String,
    topology: Topology,
}

impl Bucket {
    pub fn new(name: impl Into<String>, pool: impl Into<String>, topology: Topology) -> Self {
        Self {
            name: name.into(),
            pool: pool.into(),
            topology,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn nodes(&self) -> &[NodeDescriptor] {
        self.topology.nodes()
    }

    pub fn num_vbuckets(&self) -> u16 {
        self.topology.num_vbuckets()
    }

    /// Owner of `vbucket`, or `None` while it is unassigned.
    pub fn partition_owner(&self, vbucket: u16) -> Result<VBucketOwner> {
        self.topology.owner_index_of(vbucket)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}

/// Name → bucket lookup shared between request handlers.
#[derive(Debug, Clone, Default)]
pub struct BucketRegistry {
    buckets: Arc<RwLock<HashMap<String, Arc<Bucket>>>>,
}

impl BucketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Bucket>> {
        let buckets = self.buckets.read().ok()?;
        buckets.get(name).cloned()
    }

    /// Register a bucket. Names are unique within the registry.
    pub fn insert(&self, bucket: Bucket) -> Result<Arc<Bucket>> {
        let mut buckets = self.buckets.write()?;
        if buckets.contains_key(bucket.name()) {
            return Err(MockError::BucketExists(
                bucket.name().to_string(),
                bucket.pool().to_string(),
            ));
        }
        let bucket = Arc::new(bucket);
        buckets.insert(bucket.name().to_string(), Arc::clone(&bucket));
        Ok(bucket)
    }

    pub fn remove(&self, name: &str) -> Result<Option<Arc<Bucket>>> {
        let mut buckets = self.buckets.write()?;
        Ok(buckets.remove(name))
    }

    pub fn bucket_names(&self) -> Result<Vec<String>> {
        let buckets = self.buckets.read()?;
        let mut names: Vec<String> = buckets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
