//! Messaging between the page side and the coordinating side of the
//! consent engine, plus the drivers for both ends.

pub mod background;
pub mod content;
pub mod errors;
pub mod messages;

pub use background::{
    BackgroundCoordinator, BackgroundSettings, FrameId, MessageSender, OptOutStatus, StatusEvent,
    TabId,
};
pub use content::{ContentSession, SessionOptions};
pub use errors::BridgeError;
pub use messages::{BackgroundMessage, ContentScriptMessage};
