pub mod internal;
pub mod relayer;

pub use internal::InternalRail;
pub use relayer::RelayerRail;
