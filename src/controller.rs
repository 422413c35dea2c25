//! The pin window controller.
//!
//! Owns the window's state machine and every mutable piece of UI state: the
//! image and its natural size, the hover latch, and the optional render
//! surface. All message handling funnels through `handle_event`, a single
//! match over the decoded `WindowEvent` set. The surface is recreated in
//! exactly one place (`paint_frame`); everything else only discards it.

use tracing::{debug, warn};
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Direct2D::{
    D2D1_FACTORY_TYPE_SINGLE_THREADED, D2D1CreateFactory, ID2D1Factory,
};
use windows::Win32::Graphics::Gdi::{BeginPaint, EndPaint, InvalidateRect, PAINTSTRUCT};
use windows::Win32::Graphics::Imaging::{CLSID_WICImagingFactory, IWICImagingFactory};
use windows::Win32::System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance};
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowRect, HCURSOR, HTCAPTION, HTCLOSE, HTMINBUTTON, IDC_SIZEALL, LoadCursorW,
    PostQuitMessage, SetCursor,
};

use crate::chrome::{self, HoverTracker};
use crate::clipboard;
use crate::error::PinError;
use crate::event::{CMD_CLOSE_WINDOW, EventOutcome, WindowEvent, hittest_code, rect_from_win};
use crate::geom::Size;
use crate::resize;
use crate::state::{PinState, drive_acquisition};
use crate::surface::{DecodedImage, RenderSurface};
use crate::window::prompt_retry_cancel;

pub struct PinController {
    hwnd: HWND,
    state: PinState,
    wic: IWICImagingFactory,
    d2d: ID2D1Factory,
    /// One valid surface at a time, or none meaning "recreate before the next
    /// frame". Only `paint_frame` creates; device loss and resize failure
    /// discard.
    surface: Option<RenderSurface>,
    image: Option<DecodedImage>,
    original_size: Size,
    hover: HoverTracker,
    move_cursor: HCURSOR,
}

impl PinController {
    /// Bootstrap the graphics factories. COM must already be initialized on
    /// this thread. Failures here are fatal to startup.
    pub fn new() -> Result<Self, PinError> {
        unsafe {
            let wic: IWICImagingFactory =
                CoCreateInstance(&CLSID_WICImagingFactory, None, CLSCTX_INPROC_SERVER)
                    .map_err(PinError::Bootstrap)?;
            let d2d: ID2D1Factory = D2D1CreateFactory(D2D1_FACTORY_TYPE_SINGLE_THREADED, None)
                .map_err(PinError::Bootstrap)?;
            let move_cursor = LoadCursorW(None, IDC_SIZEALL).map_err(PinError::Bootstrap)?;

            Ok(Self {
                hwnd: HWND::default(),
                state: PinState::Uninitialized,
                wic,
                d2d,
                surface: None,
                image: None,
                original_size: Size::default(),
                hover: HoverTracker::default(),
                move_cursor,
            })
        }
    }

    /// Bind the controller to its created window and start waiting for an
    /// image.
    pub fn attach(&mut self, hwnd: HWND) {
        self.hwnd = hwnd;
        self.state = PinState::AwaitingImage;
        debug!(state = ?self.state, "window attached");
    }

    /// Acquire the clipboard image, prompting the user to retry on failure.
    /// Returns true once an image is pinned; false means the user cancelled
    /// and the controller is Closing.
    pub fn await_image(&mut self) -> bool {
        let wic = self.wic.clone();
        let hwnd = self.hwnd;
        let image = drive_acquisition(
            &mut self.state,
            || {
                let bitmap = clipboard::read_clipboard_bitmap(hwnd)?;
                DecodedImage::from_clipboard_bitmap(&wic, &bitmap)
            },
            || prompt_retry_cancel(hwnd),
        );
        match image {
            Some(image) => {
                self.original_size = image.size();
                self.image = Some(image);
                debug!(
                    width = self.original_size.width,
                    height = self.original_size.height,
                    "clipboard image pinned"
                );
                true
            }
            None => false,
        }
    }

    pub fn original_size(&self) -> Size {
        self.original_size
    }

    /// Dispatch one decoded window event.
    pub fn handle_event(&mut self, event: WindowEvent) -> EventOutcome {
        match event {
            WindowEvent::ResizeBegin => {
                if self.state == PinState::Ready {
                    self.state = PinState::Resizing;
                }
                EventOutcome::Unhandled
            }
            WindowEvent::ResizeDrag { edge, mut rect } => {
                resize::adjust_for_aspect(edge, &mut rect, self.original_size);
                EventOutcome::Sizing(rect)
            }
            WindowEvent::ResizeEnd => {
                if self.state == PinState::Resizing {
                    self.state = PinState::Ready;
                }
                EventOutcome::Unhandled
            }
            WindowEvent::Resized { width, height } => {
                self.on_resized(width, height);
                EventOutcome::Unhandled
            }
            WindowEvent::HitTest { x, y } => self.on_hit_test(x, y),
            WindowEvent::NcButtonDown { hit } => {
                // Swallow presses on the synthetic buttons so the platform's
                // fallback button handling never engages.
                if hit == HTMINBUTTON || hit == HTCLOSE {
                    EventOutcome::Result(0)
                } else {
                    EventOutcome::Unhandled
                }
            }
            WindowEvent::NcButtonUp { hit } => {
                if hit == HTMINBUTTON {
                    EventOutcome::Minimize
                } else if hit == HTCLOSE {
                    self.request_close();
                    EventOutcome::Result(0)
                } else {
                    EventOutcome::Unhandled
                }
            }
            WindowEvent::SetCursor { hit } => {
                if hit == HTCAPTION {
                    unsafe {
                        let _ = SetCursor(Some(self.move_cursor));
                    }
                    EventOutcome::Result(1)
                } else {
                    EventOutcome::Unhandled
                }
            }
            WindowEvent::Paint => EventOutcome::Result(self.on_paint()),
            WindowEvent::Command { id } => {
                if id == CMD_CLOSE_WINDOW {
                    self.request_close();
                    EventOutcome::Result(0)
                } else {
                    EventOutcome::Unhandled
                }
            }
            WindowEvent::Destroy => {
                self.request_close();
                EventOutcome::Result(0)
            }
        }
    }

    fn request_close(&mut self) {
        self.state = PinState::Closing;
        debug!("close requested");
        unsafe {
            PostQuitMessage(0);
        }
    }

    fn request_repaint(&self) {
        unsafe {
            let _ = InvalidateRect(Some(self.hwnd), None, true);
        }
    }

    /// Classify the cursor position, latch hover, and answer the query. The
    /// hover latch is updated for every zone result so leaving the button
    /// band from any direction repaints exactly once.
    fn on_hit_test(&mut self, x: i32, y: i32) -> EventOutcome {
        let mut rc = RECT::default();
        if unsafe { GetWindowRect(self.hwnd, &mut rc) }.is_err() {
            return EventOutcome::Unhandled;
        }
        let zone = chrome::classify_point(x, y, rect_from_win(rc));
        if self.hover.update(zone.is_button()) {
            self.request_repaint();
        }
        match hittest_code(zone) {
            Some(code) => EventOutcome::Result(code as isize),
            None => EventOutcome::Unhandled,
        }
    }

    /// Committed size change: interactive resizes land back in Ready, and the
    /// surface follows the client area. A surface that cannot resize in place
    /// is discarded and recreated on the next paint.
    fn on_resized(&mut self, width: u32, height: u32) {
        if self.state == PinState::Resizing {
            self.state = PinState::Ready;
        }
        if let Some(surface) = &self.surface
            && surface.resize(Size::new(width, height)).is_err()
        {
            warn!(width, height, "surface resize failed; discarding");
            self.surface = None;
        }
    }

    fn on_paint(&mut self) -> isize {
        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(self.hwnd, &mut ps) };
        if hdc.is_invalid() {
            return 1;
        }
        let result = self.paint_frame();
        unsafe {
            let _ = EndPaint(self.hwnd, &ps);
        }
        match result {
            Ok(()) => 0,
            Err(e) => {
                warn!(error = %e, "paint failed");
                1
            }
        }
    }

    /// The one place the surface is (re)created. Device loss discards the
    /// surface (and with it the device-side image) and schedules a repaint so
    /// the next frame rebuilds everything.
    fn paint_frame(&mut self) -> Result<(), PinError> {
        if self.surface.is_none() {
            self.surface = Some(RenderSurface::create(&self.d2d, self.hwnd)?);
        }
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        match surface.draw(self.image.as_ref(), self.hover.active()) {
            Err(PinError::DeviceLost) => {
                self.surface = None;
                self.request_repaint();
                Ok(())
            }
            other => other,
        }
    }
}
