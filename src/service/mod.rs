//! Service layer: business logic orchestration.
//!
//! [`SyncService`] coordinates the sync protocol, delegates diff
//! computation to [`crate::diff`], and emits events through the
//! [`super::domain::EventBus`].

pub mod sync_service;

pub use sync_service::SyncService;
