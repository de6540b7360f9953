pub mod error;
pub mod schedule;
pub mod types;

pub use error::CoreError;
pub use schedule::RewardSchedule;
pub use types::{elapsed_hours, remaining_whole_hours, Coins, DayKey, WalletAddress};
