//! # lectern-upstream
//!
//! Client for the upstream lecture-schedule API.
//!
//! ## Features
//!
//! - **Transport**: HTTPS via `reqwest` with gzip/deflate/brotli decoding and
//!   a bounded timeout, behind the [`Transport`] trait
//! - **Credentials**: timestamp/signature tokens, rejecting HTML challenge
//!   pages served in place of JSON
//! - **Content**: signed per-category requests, base64 payload unwrapping
//! - **Rewriting**: case-insensitive brand substitution over record strings
//!
//! ## Quick Start
//!
//! ```ignore
//! use lectern_upstream::{
//!     Category, ContentFetcher, HttpTransport, Rewriter, TokenProvider, UpstreamConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> lectern_upstream::Result<()> {
//!     let config = UpstreamConfig::builder().build()?;
//!     let transport = HttpTransport::new(config.timeout)?;
//!
//!     let tokens = TokenProvider::new(transport.clone(), &config)?;
//!     let fetcher = ContentFetcher::new(transport, &config, Rewriter::default())?;
//!
//!     let credential = tokens.get_token().await?;
//!     let live = fetcher.fetch_category(Category::Live, &credential).await?;
//!     println!("{} live classes", live.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod category;
pub mod config;
pub mod content;
mod error;
pub mod record;
pub mod rewrite;
pub mod token;
pub mod transport;

pub use category::Category;
pub use config::{UpstreamConfig, UpstreamConfigBuilder};
pub use content::{ContentFetcher, decode_payload};
pub use error::{Error, Result};
pub use record::Record;
pub use rewrite::{DEFAULT_BRAND, Rewriter, Substitution};
pub use token::{Credential, Timestamp, TokenProvider};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
#[cfg(any(test, feature = "test-util"))]
pub use transport::{MockResponse, MockTransport};
