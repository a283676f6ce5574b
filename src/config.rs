//! Client-routing bucket config
//!
//! Renders a bucket's topology into the JSON document Couchbase client SDKs
//! fetch to build their vbucket routing table. Fixed-field record types keep
//! the structure deterministic: identical topology state always serializes
//! to the same logical JSON.
//!
//! Positional correspondence is load-bearing: entry `i` of `vBucketMap`
//! names the owner of vbucket `i` as a position in `serverList`, which
//! follows node order exactly. An empty entry means "no owner currently
//! reachable" and is distinct from `[0]` (the first node).

use serde::Serialize;

use crate::bucket::Bucket;
use crate::core::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    pub name: String,
    pub bucket_type: String,
    pub auth_type: String,
    pub sasl_password: String,
    pub proxy_port: u16,
    pub uri: String,
    pub streaming_uri: String,
    pub flush_cache_uri: String,
    pub nodes: Vec<String>,
    pub stats: StatsRef,
    pub node_locator: String,
    #[serde(rename = "vBucketServerMap")]
    pub vbucket_server_map: VBucketServerMap,
}

#[derive(Debug, Serialize)]
pub struct StatsRef {
    pub uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VBucketServerMap {
    pub hash_algorithm: String,
    pub num_replicas: u16,
    pub server_list: Vec<String>,
    #[serde(rename = "vBucketMap")]
    pub vbucket_map: Vec<Vec<usize>>,
}

impl BucketConfig {
    /// Build the config from the bucket's current topology.
    ///
    /// Computed on demand from one ownership snapshot per call; the whole
    /// document reflects a single consistent topology state even while a
    /// rebalance is swapping the map.
    pub fn from_bucket(bucket: &Bucket) -> Result<Self> {
        let pool = bucket.pool();
        let name = bucket.name();
        let base = format!("/pools/{pool}/buckets/{name}");

        let nodes = bucket.nodes().iter().map(|n| n.authority()).collect();
        let server_list: Vec<String> =
            bucket.nodes().iter().map(|n| n.socket_name()).collect();

        let snapshot = bucket.topology().partition_map()?;
        let vbucket_map = snapshot
            .iter()
            .map(|owner| match owner {
                Some(index) => vec![*index],
                None => vec![],
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            bucket_type: "membase".to_string(),
            auth_type: "sasl".to_string(),
            sasl_password: String::new(),
            proxy_port: 0,
            uri: base.clone(),
            streaming_uri: format!("/pools/{pool}/bucketsStreaming/{name}"),
            flush_cache_uri: format!("{base}/controller/doFlush"),
            nodes,
            stats: StatsRef {
                uri: format!("{base}/stats"),
            },
            node_locator: "vbucket".to_string(),
            vbucket_server_map: VBucketServerMap {
                hash_algorithm: "CRC".to_string(),
                num_replicas: 0,
                server_list,
                vbucket_map,
            },
        })
    }
}
