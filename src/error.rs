//! Error kinds for the pin window.
//!
//! Only `Bootstrap` escapes to `main` and terminates the process; the other
//! kinds are handled by the controller (retry prompt, lazy recreation) and
//! never surface as crashes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinError {
    /// Graphics/COM subsystem setup failed. Fatal; aborts startup.
    #[error("graphics bootstrap failed")]
    Bootstrap(#[source] windows::core::Error),

    /// The clipboard held no usable bitmap. Recoverable via the retry prompt.
    #[error("no image available in the clipboard")]
    NoImage,

    /// The render target became invalid and must be recreated before the next
    /// frame. Self-healed; never user-visible.
    #[error("render device lost")]
    DeviceLost,

    /// A draw or surface-resize call failed; the surface is discarded and
    /// lazily recreated.
    #[error("drawing failed")]
    Render(#[source] windows::core::Error),
}
