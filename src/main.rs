use clap::Parser;
use couchmock::{ClusterConfig, MockCluster};
use std::error::Error;

/// Mock Couchbase cluster serving the views REST API
#[derive(Parser, Debug)]
#[command(name = "couchmock", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8092")]
    listen: String,

    /// Hostname advertised to clients in the bucket config
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Name of the bucket provisioned at startup
    #[arg(long, default_value = "default")]
    bucket: String,

    /// Number of data nodes
    #[arg(long, default_value_t = 1)]
    nodes: usize,

    /// Vbuckets per bucket
    #[arg(long, default_value_t = 1024)]
    vbuckets: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "couchmock=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = ClusterConfig::new()
        .hostname(&args.hostname)
        .default_bucket(&args.bucket)
        .num_nodes(args.nodes)
        .num_vbuckets(args.vbuckets);
    let cluster = MockCluster::new(config)?;

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    tracing::info!(listen = %args.listen, "couchmock listening");
    axum::serve(listener, cluster.router()).await?;
    Ok(())
}
