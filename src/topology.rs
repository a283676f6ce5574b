//! Cluster topology and partition ownership
//!
//! A [`Topology`] holds the ordered node list and the vbucket → node
//! ownership map for one bucket. The node list and vbucket count are fixed
//! at provisioning; ownership changes only through whole-map replacement,
//! so concurrent readers always see a consistent snapshot.

use std::sync::{Arc, RwLock};

use crate::core::{MockError, Result};

/// A data node as seen by clients.
///
/// `port` is the client-facing port advertised in the `nodes` list of the
/// bucket config; `admin_port` is the data socket advertised in
/// `serverList`. Descriptors are immutable once assigned to a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub host: String,
    pub port: u16,
    pub admin_port: u16,
}

impl NodeDescriptor {
    pub fn new(host: impl Into<String>, port: u16, admin_port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            admin_port,
        }
    }

    /// Client-facing authority, e.g. `"127.0.0.1:8091"`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Data socket name, e.g. `"127.0.0.1:11210"`.
    pub fn socket_name(&self) -> String {
        format!("{}:{}", self.host, self.admin_port)
    }
}

/// Owner of a single vbucket: an index into the topology's node list,
/// or `None` while the vbucket is unassigned (e.g. during provisioning).
pub type VBucketOwner = Option<usize>;

/// Partition ownership for one bucket.
///
/// Reads clone an `Arc` snapshot of the map; [`Topology::replace_partition_map`]
/// swaps the whole `Arc`, so a reader observes either the fully-old or the
/// fully-new mapping, never a mix.
#[derive(Debug)]
pub struct Topology {
    nodes: Vec<NodeDescriptor>,
    num_vbuckets: u16,
    partition_map: RwLock<Arc<Vec<VBucketOwner>>>,
}

impl Topology {
    /// Create a topology with every vbucket unassigned.
    pub fn new(nodes: Vec<NodeDescriptor>, num_vbuckets: u16) -> Self {
        let map = vec![None; num_vbuckets as usize];
        Self {
            nodes,
            num_vbuckets,
            partition_map: RwLock::new(Arc::new(map)),
        }
    }

    /// Ordered node descriptors. Order is a stable identity: positions in
    /// the partition map and in the serialized `serverList` refer to it.
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn num_vbuckets(&self) -> u16 {
        self.num_vbuckets
    }

    /// Current owner of `vbucket`, or `None` if unassigned.
    ///
    /// An id outside `0..num_vbuckets` is an error; an unassigned vbucket
    /// is not.
    pub fn owner_index_of(&self, vbucket: u16) -> Result<VBucketOwner> {
        if vbucket >= self.num_vbuckets {
            return Err(MockError::VBucketOutOfRange(vbucket, self.num_vbuckets));
        }
        let map = self.partition_map.read()?;
        Ok(map[vbucket as usize])
    }

    /// Snapshot of the whole ownership map.
    ///
    /// The returned `Arc` stays internally consistent even if a rebalance
    /// replaces the live map afterwards.
    pub fn partition_map(&self) -> Result<Arc<Vec<VBucketOwner>>> {
        let map = self.partition_map.read()?;
        Ok(Arc::clone(&map))
    }

    /// Atomically replace the ownership map, as a rebalance does.
    ///
    /// The new map must cover every vbucket and reference only existing
    /// nodes; otherwise the live map is left untouched.
    pub fn replace_partition_map(&self, map: Vec<VBucketOwner>) -> Result<()> {
        if map.len() != self.num_vbuckets as usize {
            return Err(MockError::PartitionMapLength(map.len(), self.num_vbuckets));
        }
        for (vb, owner) in map.iter().enumerate() {
            if let Some(index) = owner {
                if *index >= self.nodes.len() {
                    return Err(MockError::NodeIndexOutOfRange(
                        vb as u16,
                        *index,
                        self.nodes.len(),
                    ));
                }
            }
        }
        let mut live = self.partition_map.write()?;
        *live = Arc::new(map);
        Ok(())
    }

    /// Assign every vbucket an owner, round-robin over the node list.
    pub fn assign_round_robin(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return self.replace_partition_map(vec![None; self.num_vbuckets as usize]);
        }
        let map = (0..self.num_vbuckets as usize)
            .map(|vb| Some(vb % self.nodes.len()))
            .collect();
        self.replace_partition_map(map)
    }
}
