//! Atomic DOM actions
//!
//! The four primitives rule steps are built from (`exists`, `visible`,
//! `click`, `eval`) plus the cosmetic hiding helper. They are implemented once
//! in [`PageActions`] on top of a small [`DomPort`], so any page binding that
//! can list elements, click one and evaluate an expression can drive the
//! engine.

pub mod actions;
pub mod errors;
pub mod model;
pub mod ports;
pub mod prehide;
pub mod snapshot;

pub use actions::{is_truthy, reduce_visibility, ConsentActions, PageActions};
pub use errors::DomError;
pub use model::{ElementLayout, HideMethod};
pub use ports::DomPort;
pub use prehide::{hiding_rule, STYLE_ELEMENT_ID};
pub use snapshot::{PageEvent, PageSnapshot, StaticPage};
