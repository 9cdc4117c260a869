//! Blocking client for the OpenAI REST API.
//!
//! Every call goes through an [`ApiTransport`]; [`ReqwestTransport`] is the
//! production implementation and the `mock` feature adds a scripted one.
//!
//! ```no_run
//! use openai_provider_client::{OpenAiClient, ProviderConfig};
//!
//! # fn main() -> Result<(), openai_provider_client::ClientError> {
//! let client = OpenAiClient::new(ProviderConfig::from_env()?)?;
//! for project in client.list_projects(false)? {
//!     println!("{} {}", project.id, project.name);
//! }
//! # Ok(())
//! # }
//! ```

/// Typed endpoint groups.
pub mod api;
/// Bearer-token client and pagination.
pub mod client;
/// Provider-wide configuration.
pub mod config;
/// Client error type.
pub mod errors;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Request description and transports.
pub mod transport;

pub use api::assistants::{Assistant, AssistantRequest};
pub use api::files::FileObject;
pub use api::invites::{CreateInviteRequest, Invite, InviteProject};
pub use api::moderations::{ModerationInput, ModerationRequest, ModerationResponse, ModerationResult};
pub use api::projects::{Project, ProjectUser};
pub use api::users::OrganizationUser;
pub use api::vector_stores::{
    ChunkingStrategy, CreateVectorStoreFileRequest, CreateVectorStoreRequest, ExpiresAfter,
    FileCounts, StaticChunking, UpdateVectorStoreRequest, VectorStore, VectorStoreFile,
    VectorStoreFileError,
};
pub use client::{DeletionStatus, ListPage, OpenAiClient, PAGE_LIMIT};
pub use config::ProviderConfig;
pub use errors::ClientError;
pub use transport::{ApiRequest, ApiTransport, AuthScope, Method, ReqwestTransport, RequestBody};
