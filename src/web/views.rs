//! Request parsing and dispatch for the views API
//!
//! A [`ViewRequest`] is an explicit value (method, path, body) resolved
//! against the bucket registry, independent of any listener. Parsing
//! validates everything up front; execution only touches the config
//! serializer or the view engine.

use std::sync::Arc;

use axum::http::Method;

use crate::bucket::{Bucket, BucketRegistry};
use crate::config::BucketConfig;
use crate::core;
use crate::web::ViewsError;

/// The operation a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOperation {
    /// `GET /:bucket`, serves the client-routing bucket config.
    ListBucket,
    /// `GET /:bucket/_all_docs`
    AllDocs,
    /// `GET /:bucket/_design/:doc`
    GetDesignDoc { doc: String },
    /// `GET /:bucket/_design/:doc/_view/:view`
    QueryView { doc: String, view: String },
    /// Any other GET shape; sub-route interpretation belongs to the engine.
    GetPath { segments: Vec<String> },
    /// `PUT /:bucket/:marker/:doc`, exactly two trailing segments.
    PutDesignDoc { marker: String, doc: String },
    /// DELETE with any trailing shape. Intentionally looser than PUT,
    /// matching the original server's asymmetry.
    DeleteDesignDoc { segments: Vec<String> },
}

/// Executes view operations against the out-of-scope document store.
///
/// The bundled [`NullViewEngine`] accepts everything and returns empty
/// payloads, which is all the routing contract needs.
pub trait ViewEngine: Send + Sync {
    fn execute(
        &self,
        bucket: &Bucket,
        operation: &ViewOperation,
        body: &[u8],
    ) -> core::Result<Vec<u8>>;
}

/// View engine that stores nothing and answers every operation with an
/// empty payload.
#[derive(Debug, Default)]
pub struct NullViewEngine;

impl ViewEngine for NullViewEngine {
    fn execute(
        &self,
        _bucket: &Bucket,
        _operation: &ViewOperation,
        _body: &[u8],
    ) -> core::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// A parsed, bucket-resolved views request.
#[derive(Debug)]
pub struct ViewRequest {
    bucket: Arc<Bucket>,
    operation: ViewOperation,
    body: Vec<u8>,
}

impl ViewRequest {
    /// Parse and validate a request against the endpoint grammar.
    ///
    /// The bucket is resolved before the method is validated: an unknown
    /// bucket is a 404 no matter what the method is.
    pub fn parse(
        method: &Method,
        path: &str,
        body: Vec<u8>,
        registry: &BucketRegistry,
    ) -> Result<Self, ViewsError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let bucket_name = segments.next().ok_or(ViewsError::BucketNotFound)?;
        let bucket = registry
            .lookup(bucket_name)
            .ok_or(ViewsError::BucketNotFound)?;
        let rest: Vec<String> = segments.map(str::to_string).collect();

        let operation = match method.as_str() {
            "GET" => match rest.as_slice() {
                [] => ViewOperation::ListBucket,
                [first] if first.as_str() == "_all_docs" => ViewOperation::AllDocs,
                [marker, doc] if marker.as_str() == "_design" => ViewOperation::GetDesignDoc {
                    doc: doc.clone(),
                },
                [marker, doc, inner, view]
                    if marker.as_str() == "_design" && inner.as_str() == "_view" =>
                {
                    ViewOperation::QueryView {
                        doc: doc.clone(),
                        view: view.clone(),
                    }
                }
                _ => ViewOperation::GetPath {
                    segments: rest.clone(),
                },
            },
            "PUT" => match rest.as_slice() {
                [marker, doc] => ViewOperation::PutDesignDoc {
                    marker: marker.clone(),
                    doc: doc.clone(),
                },
                _ => return Err(ViewsError::BadPutPath),
            },
            "DELETE" => ViewOperation::DeleteDesignDoc { segments: rest },
            _ => return Err(ViewsError::MethodNotAllowed),
        };

        Ok(Self {
            bucket,
            operation,
            body,
        })
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn operation(&self) -> &ViewOperation {
        &self.operation
    }

    /// Run the operation. Config requests render the bucket config;
    /// everything else is delegated to the engine. Faults come back as
    /// unclassified internals and never carry detail to the client.
    pub fn execute(&self, engine: &dyn ViewEngine) -> Result<Vec<u8>, ViewsError> {
        match &self.operation {
            ViewOperation::ListBucket => {
                let config = BucketConfig::from_bucket(&self.bucket)
                    .map_err(|e| ViewsError::Internal(e.to_string()))?;
                serde_json::to_vec(&config).map_err(|e| ViewsError::Internal(e.to_string()))
            }
            operation => engine
                .execute(&self.bucket, operation, &self.body)
                .map_err(|e| ViewsError::Internal(e.to_string())),
        }
    }
}
