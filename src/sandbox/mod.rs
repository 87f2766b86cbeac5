pub mod channel;
pub mod service;
pub mod types;

pub use channel::ChannelSandbox;
pub use service::{SandboxError, SandboxService, Subscription};
pub use types::{DecodeError, InboundEvent, OutboundCommand, PreviewFile, PreviewTree};
