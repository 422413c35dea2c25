//! Pin the clipboard image as an always-on-top sticky note.
//!
//! Reads the bitmap currently on the clipboard and pins it to the desktop as
//! a borderless, topmost window that still behaves like a normal one: the
//! whole image is a drag handle, invisible borders resize it (locked to the
//! image's aspect ratio), and hovering the top-right corner reveals synthetic
//! minimize/close buttons drawn over the image.
//!
//! High-level flow:
//! 1. Parse CLI (title override + verbosity flags) and initialize tracing.
//! 2. Initialize COM and per-monitor DPI awareness; bootstrap the WIC and
//!    Direct2D factories.
//! 3. Create the (hidden) pin window and attach the controller to it.
//! 4. Acquire the clipboard image, prompting retry/cancel while none is
//!    available; cancel exits nonzero before the message loop starts.
//! 5. Register the controller, show the window topmost at the image's
//!    natural size, and run the message loop until WM_QUIT (close button,
//!    Ctrl+W / Esc accelerator, window destruction, or Ctrl+C).
//!
//! All window behavior, from hit testing to device loss recovery, runs
//! synchronously inside the message handlers.

mod chrome;
mod clipboard;
mod controller;
mod error;
mod event;
mod geom;
mod logging;
mod resize;
mod state;
mod surface;
mod window;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Com::{
    COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE, CoInitializeEx, CoUninitialize,
};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};

use controller::PinController;
use logging::{LogLevel, configure_logging};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(
    version,
    about = concat!(
        env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"),
        " - Pin the clipboard image as an always-on-top borderless note.",
    )
)]
struct Cli {
    /// Window title (shown in the taskbar and Alt-Tab only; the window itself
    /// has no title bar).
    #[arg(long = "title", default_value = "Stickpin")]
    title: String,
    /// Increase verbosity (-v=debug, -vv=trace). Overrides RUST_LOG.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
    /// Quiet mode: only warnings and errors. Overrides -v and RUST_LOG.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

/// Scoped COM apartment; uninitializes on drop, after everything COM-backed
/// has been torn down.
struct ComApartment;

impl ComApartment {
    fn initialize() -> Result<Self> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE).ok()?;
        }
        Ok(Self)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

/// Program entry point.
///
/// Bootstrap errors (COM, factories, window class/window creation) propagate
/// out with a nonzero exit code before the message loop starts; everything
/// after that is handled inside the controller and the process exits 0 on a
/// normal close.
fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(LogLevel::from_flags(cli.quiet, cli.verbose));

    info!(version = env!("CARGO_PKG_VERSION"), "starting stickpin");

    let _com = ComApartment::initialize()?;
    unsafe {
        // Basic per-monitor awareness; finer DPI handling is out of scope.
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_err() {
            warn!("per-monitor DPI awareness not available");
        }
    }

    let mut controller = PinController::new()?;
    let hwnd = window::create_pin_window(&cli.title)?;
    controller.attach(hwnd);

    // Ctrl+C -> graceful quit (must post WM_QUIT to the ORIGINAL thread;
    // PostQuitMessage on the handler thread is ineffective).
    let main_tid = unsafe { GetCurrentThreadId() };
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down");
        unsafe {
            let _ = PostThreadMessageW(main_tid, WM_QUIT, WPARAM(0), LPARAM(0));
        }
    })?;

    if !controller.await_image() {
        bail!("no image available in the clipboard");
    }
    let size = controller.original_size();
    info!(
        width = size.width,
        height = size.height,
        "pinning clipboard image"
    );

    window::register_controller(hwnd, Rc::new(RefCell::new(controller)));
    window::show_pinned(hwnd, size)?;

    let haccel = window::create_close_accelerators()?;
    let result = window::run_message_loop(hwnd, haccel);
    window::destroy_accelerators(haccel);
    window::unregister_controller(hwnd);

    result
}
