//! # challan-db: Database Layer for the Challan Engine
//!
//! SQLite storage for the delivery-challan system: the connection pool,
//! embedded migrations, the atomic document-number allocator and the
//! shipment transaction orchestrator.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Challan Engine Data Flow                    │
//! │                                                             │
//! │  Caller (wizard handler, form, export job)                  │
//! │       │                                                     │
//! │  ┌────▼───────────────────────────────────────────────┐     │
//! │  │              challan-db (THIS CRATE)               │     │
//! │  │                                                    │     │
//! │  │  Database (pool.rs)      Repositories              │     │
//! │  │  SqlitePool, WAL,        sequence  ── atomic       │     │
//! │  │  busy timeout            numbering    upsert       │     │
//! │  │                          challan                   │     │
//! │  │  Migrations (embedded)   shipment  ── 1 transit +  │     │
//! │  │  migrations/sqlite/*.sql              N official   │     │
//! │  └────┬───────────────────────────────────────────────┘     │
//! │       │                                                     │
//! │  ┌────▼───────────────────────────────────────────────┐     │
//! │  │                 SQLite Database                    │     │
//! │  └────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use challan_db::{Database, DbConfig};
//! use challan_core::types::DcType;
//!
//! let db = Database::new(DbConfig::new("./data/challan.db")).await?;
//!
//! // Read-only preview for a form
//! let preview = db.numbering().peek_next_number(project_id, DcType::Transit).await?;
//!
//! // The full wizard transaction
//! let result = db.shipments().create_shipment_group(params).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ShipmentError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::challan::{ChallanRepository, SerialConflict};
pub use repository::numbering::NumberingRepository;
pub use repository::project::{NewProject, Project, ProjectRepository};
pub use repository::sequence::SequenceRepository;
pub use repository::shipment::ShipmentRepository;
