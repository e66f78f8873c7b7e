pub mod app;
pub mod check;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod frame;
pub mod output;
pub mod prehide;
pub mod runtime;
pub mod validate;

pub use check::{cmd_check, CheckArgs};
pub use frame::{cmd_frame, FrameArgs};
pub use prehide::{cmd_prehide, PrehideArgs};
pub use validate::{cmd_validate, ValidateArgs};
