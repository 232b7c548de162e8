//! Configuration: persisted application settings and built-in scan profiles.

mod profiles;
mod settings;

pub use profiles::{Profile, ProfilePorts};
pub use settings::AppSettings;
