//! `multipart/mixed` encoding of asset uploads.
//!
//! The body is a JSON metadata part followed by an octet-stream part whose
//! `Content-MD5` header is the base64 MD5 digest of the content:
//!
//! ```text
//! --frontier
//! Content-Type: application/json; charset=utf-8
//! Content-length: <metadata length>
//!
//! <metadata>
//! --frontier
//! Content-Type: application/octet-stream
//! Content-length: <content length>
//! Content-MD5: <digest>
//!
//! <content>
//! --frontier--
//! ```
//!
//! All line breaks are CRLF. Encoding is a pure function of its inputs.

use base64::Engine;
use bytes::{BufMut, Bytes, BytesMut};
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::Result;

/// Boundary used by the asset endpoint.
pub const DEFAULT_BOUNDARY: &str = "frontier";

/// JSON metadata plus raw content for one upload.
#[derive(Debug, Clone)]
pub struct MultipartAsset {
    metadata: serde_json::Value,
    content: Bytes,
    boundary: String,
}

/// An encoded upload body ready to hand to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub content_type: String,
    pub content_md5: String,
    pub body: Bytes,
}

impl MultipartAsset {
    pub fn new<M: Serialize>(metadata: &M, content: impl Into<Bytes>) -> Result<Self> {
        Ok(Self {
            metadata: serde_json::to_value(metadata)?,
            content: content.into(),
            boundary: DEFAULT_BOUNDARY.to_string(),
        })
    }

    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Base64 MD5 digest of the content.
    pub fn content_md5(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(Md5::digest(&self.content))
    }

    /// Build the multipart body.
    pub fn encode(&self) -> Result<MultipartBody> {
        let metadata = serde_json::to_vec(&self.metadata)?;
        let content_md5 = self.content_md5();
        let boundary = &self.boundary;

        let mut body = BytesMut::with_capacity(metadata.len() + self.content.len() + 256);
        body.put_slice(format!("--{boundary}\r\n").as_bytes());
        body.put_slice(b"Content-Type: application/json; charset=utf-8\r\n");
        body.put_slice(format!("Content-length: {}\r\n\r\n", metadata.len()).as_bytes());
        body.put_slice(&metadata);
        body.put_slice(b"\r\n");

        body.put_slice(format!("--{boundary}\r\n").as_bytes());
        body.put_slice(b"Content-Type: application/octet-stream\r\n");
        body.put_slice(format!("Content-length: {}\r\n", self.content.len()).as_bytes());
        body.put_slice(format!("Content-MD5: {content_md5}\r\n\r\n").as_bytes());
        body.put_slice(&self.content);
        body.put_slice(b"\r\n");

        body.put_slice(format!("--{boundary}--\r\n").as_bytes());

        Ok(MultipartBody {
            content_type: format!("multipart/mixed; boundary={boundary}"),
            content_md5,
            body: body.freeze(),
        })
    }
}
