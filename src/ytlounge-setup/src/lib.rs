mod flow;
mod lifecycle;

pub use flow::{FlowStep, PairingFlow, TRIAL_VIDEO_ID};
pub use lifecycle::{EntryManager, LifecycleError};
