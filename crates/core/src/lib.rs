pub mod classify;
pub mod clock;
pub mod profile;

pub use classify::{classify, explain, score_profile, ClassificationResult, ProfileScore};
pub use clock::{announce_time, format_clock};
pub use profile::{CurrencyProfile, ProfileError, ProfileSet};
