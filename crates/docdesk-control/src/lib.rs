//! Control plane for book access and ownership
//!
//! Every component checks the caller against [`docdesk_auth::authorize`]
//! before reading or writing domain state, and runs its storage work under
//! the configured timeout.

pub mod config;
pub mod dashboard;
pub mod error;
mod guard;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod moderation;
pub mod options;
pub mod plane;
pub mod registry;
pub mod tokens;
pub mod transfer;
pub mod validation;

pub use config::ControlConfig;
pub use dashboard::Dashboard;
pub use error::{ControlError, ErrorKind, ValidationError};
pub use identity::IdentityStore;
pub use ledger::MembershipLedger;
pub use models::*;
pub use moderation::ModerationGate;
pub use options::SiteOptions;
pub use plane::ControlPlane;
pub use registry::ProjectRegistry;
pub use tokens::AccessTokenIssuer;
pub use transfer::OwnershipTransfer;

pub use docdesk_auth::{Caller, TokenAlphabet};
