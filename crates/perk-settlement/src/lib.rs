//! Perk Settlement Layer
//!
//! Provides the token rail abstraction and pluggable adapters for moving
//! reward units to user wallets (external relayers, internal ledgers), plus
//! a deadline wrapper that bounds rail latency.

pub mod adapters;
pub mod bounded;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use bounded::DeadlineRail;
pub use error::TransferError;
pub use registry::RailRegistry;
pub use traits::ITokenRail;
pub use types::{TransferId, TransferReceipt};
