//! Mock cluster provisioning and lifecycle
//!
//! A [`MockCluster`] owns the bucket registry for its whole lifetime:
//! created when the cluster is provisioned, dropped with it. Handlers only
//! ever see registry handles passed in at router construction.

use std::sync::Arc;

use crate::bucket::{Bucket, BucketRegistry};
use crate::core::{MockError, Result};
use crate::topology::{NodeDescriptor, Topology};
use crate::web::{self, NullViewEngine, ViewEngine};

/// Cluster shape used at provisioning
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Hostname advertised in node descriptors
    pub hostname: String,

    /// Pool the buckets belong to
    pub pool: String,

    /// Name of the bucket provisioned at startup
    pub default_bucket: String,

    /// Number of data nodes
    pub num_nodes: usize,

    /// Client port of the first node; node `i` advertises `bucket_start_port + i`
    pub bucket_start_port: u16,

    /// Data socket port of the first node
    pub admin_start_port: u16,

    /// Vbuckets per bucket, fixed for the bucket's lifetime
    pub num_vbuckets: u16,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            pool: "default".to_string(),
            default_bucket: "default".to_string(),
            num_nodes: 1,
            bucket_start_port: 8091,
            admin_start_port: 11210,
            num_vbuckets: 1024,
        }
    }
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn pool(mut self, pool: &str) -> Self {
        self.pool = pool.to_string();
        self
    }

    pub fn default_bucket(mut self, name: &str) -> Self {
        self.default_bucket = name.to_string();
        self
    }

    pub fn num_nodes(mut self, num_nodes: usize) -> Self {
        self.num_nodes = num_nodes;
        self
    }

    pub fn bucket_start_port(mut self, port: u16) -> Self {
        self.bucket_start_port = port;
        self
    }

    pub fn admin_start_port(mut self, port: u16) -> Self {
        self.admin_start_port = port;
        self
    }

    pub fn num_vbuckets(mut self, num_vbuckets: u16) -> Self {
        self.num_vbuckets = num_vbuckets;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(MockError::InvalidConfig("at least one node".to_string()));
        }
        if self.num_vbuckets == 0 {
            return Err(MockError::InvalidConfig("at least one vbucket".to_string()));
        }
        // node i advertises start_port + i; the last node must still fit a u16
        let last_node = self.num_nodes - 1;
        if last_node > (u16::MAX - self.bucket_start_port) as usize
            || last_node > (u16::MAX - self.admin_start_port) as usize
        {
            return Err(MockError::InvalidConfig(format!(
                "{} nodes exceed the port space from {}/{}",
                self.num_nodes, self.bucket_start_port, self.admin_start_port
            )));
        }
        Ok(())
    }

    fn node_descriptors(&self) -> Vec<NodeDescriptor> {
        (0..self.num_nodes)
            .map(|i| {
                NodeDescriptor::new(
                    self.hostname.clone(),
                    self.bucket_start_port + i as u16,
                    self.admin_start_port + i as u16,
                )
            })
            .collect()
    }
}

/// A provisioned mock cluster: registry plus the engine backing the views
/// endpoints.
pub struct MockCluster {
    config: ClusterConfig,
    registry: BucketRegistry,
    engine: Arc<dyn ViewEngine>,
}

impl std::fmt::Debug for MockCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCluster")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl MockCluster {
    /// Provision a cluster with its default bucket, every vbucket assigned
    /// round-robin over the nodes.
    pub fn new(config: ClusterConfig) -> Result<Self> {
        Self::with_engine(config, Arc::new(NullViewEngine))
    }

    pub fn with_engine(config: ClusterConfig, engine: Arc<dyn ViewEngine>) -> Result<Self> {
        config.validate()?;
        let registry = BucketRegistry::new();
        let cluster = Self {
            config,
            registry,
            engine,
        };
        let default_bucket = cluster.config.default_bucket.clone();
        cluster.create_bucket(&default_bucket)?;
        Ok(cluster)
    }

    /// Provision an additional bucket with the cluster's node set.
    pub fn create_bucket(&self, name: &str) -> Result<Arc<Bucket>> {
        let topology = Topology::new(self.config.node_descriptors(), self.config.num_vbuckets);
        topology.assign_round_robin()?;
        let bucket = self
            .registry
            .insert(Bucket::new(name, self.config.pool.clone(), topology))?;
        tracing::info!(bucket = name, pool = %self.config.pool, "bucket provisioned");
        Ok(bucket)
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn registry(&self) -> &BucketRegistry {
        &self.registry
    }

    /// Views router bound to this cluster's registry.
    pub fn router(&self) -> axum::Router {
        web::router(self.registry.clone(), Arc::clone(&self.engine))
    }
}
