//! Trellis - the feature dependency graph engine.
//!
//! Stores typed directed relationships between features (`blocks`,
//! `blocked_by`, `depends_on`, `relates_to`), rejects edges that would
//! violate consistency (self-reference, cross-team edges, duplicates,
//! cycles), and answers per-feature blocking queries for the board.
//!
//! The engine is a library layer: the HTTP API, UI, and the feature/team
//! CRUD store are external. Features are addressed by opaque identifiers
//! and resolved through the [`directory::FeatureDirectory`] trait.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::directory::InMemoryDirectory;
//! use trellis::domain::{DependencyType, FeatureId, FeatureStatus, NewDependency, TeamId, UserId};
//! use trellis::engine::DependencyEngine;
//! use trellis::store::in_memory::new_in_memory_edge_store;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let directory = Arc::new(InMemoryDirectory::new());
//!     directory
//!         .insert(FeatureId::from("feat-login"), TeamId::from("team-auth"), FeatureStatus::InProgress)
//!         .await;
//!     directory
//!         .insert(FeatureId::from("feat-sso"), TeamId::from("team-auth"), FeatureStatus::Backlog)
//!         .await;
//!
//!     let engine = DependencyEngine::new(directory, new_in_memory_edge_store("dep".to_string()));
//!
//!     let edge = engine
//!         .create(NewDependency {
//!             source_feature_id: FeatureId::from("feat-login"),
//!             target_feature_id: FeatureId::from("feat-sso"),
//!             dep_type: DependencyType::Blocks,
//!             created_by: UserId::from("user-alice"),
//!             description: None,
//!         })
//!         .await?;
//!
//!     let view = engine.get_dependencies(&FeatureId::from("feat-sso")).await?;
//!     assert!(view.is_blocked);
//!     assert_eq!(view.incoming[0].edge.id, edge.id);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod directory;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id_generation;
pub mod store;
pub mod validate;
