use clap::Subcommand;

use super::check::CheckArgs;
use super::frame::FrameArgs;
use super::prehide::PrehideArgs;
use super::validate::ValidateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Load a rule bundle and report problems
    Validate(ValidateArgs),

    /// List the CMPs whose frame prefix matches a URL
    Frame(FrameArgs),

    /// Print the cosmetic CSS rule for the known banners
    Prehide(PrehideArgs),

    /// Dry-run detection and opt-out against a recorded page snapshot
    Check(CheckArgs),
}
