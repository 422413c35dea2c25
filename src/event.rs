//! Typed window events and outcome values.
//!
//! Raw (msg, wparam, lparam) triples are decoded once into a closed
//! `WindowEvent` enum; the controller dispatches on that with a single match
//! instead of branching over message ids. Messages with no variant fall
//! through to `DefWindowProcW` untouched.

use windows::Win32::Foundation::{LPARAM, RECT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    HTBOTTOM, HTBOTTOMLEFT, HTBOTTOMRIGHT, HTCAPTION, HTCLOSE, HTLEFT, HTMINBUTTON, HTRIGHT,
    HTTOP, HTTOPLEFT, HTTOPRIGHT, WM_COMMAND, WM_DESTROY, WM_ENTERSIZEMOVE, WM_EXITSIZEMOVE,
    WM_NCHITTEST, WM_NCLBUTTONDOWN, WM_NCLBUTTONUP, WM_PAINT, WM_SETCURSOR, WM_SIZE, WM_SIZING,
    WMSZ_BOTTOM, WMSZ_BOTTOMLEFT, WMSZ_BOTTOMRIGHT, WMSZ_LEFT, WMSZ_RIGHT, WMSZ_TOP, WMSZ_TOPLEFT,
    WMSZ_TOPRIGHT,
};

use crate::chrome::ChromeZone;
use crate::geom::Rect;
use crate::resize::ResizeEdge;

/// Command id fired by the close accelerators (Ctrl+W, Esc).
pub const CMD_CLOSE_WINDOW: u16 = 1;

/// The window messages the controller cares about, decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    /// Interactive move/size loop entered.
    ResizeBegin,
    /// Live drag proposal; the corrected rectangle is written back.
    ResizeDrag { edge: ResizeEdge, rect: Rect },
    /// Interactive move/size loop left.
    ResizeEnd,
    /// Client area committed to a new size (interactive or programmatic).
    Resized { width: u32, height: u32 },
    /// Non-client hit-test query at a screen position.
    HitTest { x: i32, y: i32 },
    /// Non-client left-button press on a hit code.
    NcButtonDown { hit: u32 },
    /// Non-client left-button release on a hit code.
    NcButtonUp { hit: u32 },
    /// Cursor shape query; `hit` is the hit code of the cursor position.
    SetCursor { hit: u32 },
    Paint,
    /// Menu/accelerator command.
    Command { id: u16 },
    Destroy,
}

/// What the wnd_proc should do with a handled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Return this value to the platform.
    Result(isize),
    /// Write the corrected drag rectangle back into the WM_SIZING parameter
    /// and report the message handled.
    Sizing(Rect),
    /// Minimize the window after the controller borrow is released; the
    /// synchronous WM_SIZE this triggers must not re-enter the controller.
    Minimize,
    /// Fall through to `DefWindowProcW`.
    Unhandled,
}

fn loword(v: usize) -> u32 {
    (v & 0xffff) as u32
}

fn hiword(v: usize) -> u32 {
    ((v >> 16) & 0xffff) as u32
}

/// Signed x from a packed screen coordinate.
fn x_lparam(lparam: LPARAM) -> i32 {
    (lparam.0 & 0xffff) as u16 as i16 as i32
}

/// Signed y from a packed screen coordinate.
fn y_lparam(lparam: LPARAM) -> i32 {
    ((lparam.0 >> 16) & 0xffff) as u16 as i16 as i32
}

/// WM_SIZING edge selector to the resize-policy edge.
fn edge_from_wmsz(wmsz: u32) -> Option<ResizeEdge> {
    match wmsz {
        WMSZ_LEFT => Some(ResizeEdge::Left),
        WMSZ_RIGHT => Some(ResizeEdge::Right),
        WMSZ_TOP => Some(ResizeEdge::Top),
        WMSZ_BOTTOM => Some(ResizeEdge::Bottom),
        WMSZ_TOPLEFT => Some(ResizeEdge::TopLeft),
        WMSZ_TOPRIGHT => Some(ResizeEdge::TopRight),
        WMSZ_BOTTOMLEFT => Some(ResizeEdge::BottomLeft),
        WMSZ_BOTTOMRIGHT => Some(ResizeEdge::BottomRight),
        _ => None,
    }
}

/// Chrome zone to the platform hit code; `Default` has no code and defers to
/// default handling.
pub fn hittest_code(zone: ChromeZone) -> Option<u32> {
    match zone {
        ChromeZone::TopLeft => Some(HTTOPLEFT),
        ChromeZone::TopRight => Some(HTTOPRIGHT),
        ChromeZone::BottomLeft => Some(HTBOTTOMLEFT),
        ChromeZone::BottomRight => Some(HTBOTTOMRIGHT),
        ChromeZone::Left => Some(HTLEFT),
        ChromeZone::Right => Some(HTRIGHT),
        ChromeZone::Top => Some(HTTOP),
        ChromeZone::Bottom => Some(HTBOTTOM),
        ChromeZone::Caption => Some(HTCAPTION),
        ChromeZone::MinimizeButton => Some(HTMINBUTTON),
        ChromeZone::CloseButton => Some(HTCLOSE),
        ChromeZone::Default => None,
    }
}

pub fn rect_from_win(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

pub fn rect_to_win(rect: Rect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

impl WindowEvent {
    /// Decode a raw message triple.
    ///
    /// # Safety
    /// For WM_SIZING, `lparam` must point at a valid RECT (the platform
    /// guarantees this for messages delivered to a wnd_proc).
    pub unsafe fn decode(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<WindowEvent> {
        match msg {
            WM_ENTERSIZEMOVE => Some(WindowEvent::ResizeBegin),
            WM_EXITSIZEMOVE => Some(WindowEvent::ResizeEnd),
            WM_SIZING => {
                let edge = edge_from_wmsz(wparam.0 as u32)?;
                let rect = unsafe { *(lparam.0 as *const RECT) };
                Some(WindowEvent::ResizeDrag {
                    edge,
                    rect: rect_from_win(rect),
                })
            }
            WM_SIZE => Some(WindowEvent::Resized {
                width: loword(lparam.0 as usize),
                height: hiword(lparam.0 as usize),
            }),
            WM_NCHITTEST => Some(WindowEvent::HitTest {
                x: x_lparam(lparam),
                y: y_lparam(lparam),
            }),
            WM_NCLBUTTONDOWN => Some(WindowEvent::NcButtonDown {
                hit: wparam.0 as u32,
            }),
            WM_NCLBUTTONUP => Some(WindowEvent::NcButtonUp {
                hit: wparam.0 as u32,
            }),
            WM_SETCURSOR => Some(WindowEvent::SetCursor {
                hit: loword(lparam.0 as usize),
            }),
            WM_PAINT => Some(WindowEvent::Paint),
            WM_COMMAND => Some(WindowEvent::Command {
                id: loword(wparam.0) as u16,
            }),
            WM_DESTROY => Some(WindowEvent::Destroy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_message_unpacks_client_dimensions() {
        let lparam = LPARAM(((600usize << 16) | 800usize) as isize);
        let ev = unsafe { WindowEvent::decode(WM_SIZE, WPARAM(0), lparam) };
        assert_eq!(
            ev,
            Some(WindowEvent::Resized {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn hit_test_coordinates_are_sign_extended() {
        // x = -5, y = 300 packed as 16-bit words.
        let packed = ((300u16 as usize) << 16) | (-5i16 as u16 as usize);
        let ev = unsafe { WindowEvent::decode(WM_NCHITTEST, WPARAM(0), LPARAM(packed as isize)) };
        assert_eq!(ev, Some(WindowEvent::HitTest { x: -5, y: 300 }));
    }

    #[test]
    fn sizing_message_carries_edge_and_rect() {
        let mut rect = RECT {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        let ev = unsafe {
            WindowEvent::decode(
                WM_SIZING,
                WPARAM(WMSZ_BOTTOMRIGHT as usize),
                LPARAM(&mut rect as *mut _ as isize),
            )
        };
        assert_eq!(
            ev,
            Some(WindowEvent::ResizeDrag {
                edge: ResizeEdge::BottomRight,
                rect: Rect::new(1, 2, 3, 4),
            })
        );
    }

    #[test]
    fn unknown_sizing_edge_is_dropped() {
        let mut rect = RECT::default();
        let ev = unsafe {
            WindowEvent::decode(WM_SIZING, WPARAM(99), LPARAM(&mut rect as *mut _ as isize))
        };
        assert_eq!(ev, None);
    }

    #[test]
    fn every_zone_but_default_maps_to_a_hit_code() {
        assert_eq!(hittest_code(ChromeZone::Caption), Some(HTCAPTION));
        assert_eq!(hittest_code(ChromeZone::CloseButton), Some(HTCLOSE));
        assert_eq!(hittest_code(ChromeZone::MinimizeButton), Some(HTMINBUTTON));
        assert_eq!(hittest_code(ChromeZone::Default), None);
    }

    #[test]
    fn unhandled_messages_decode_to_none() {
        let ev = unsafe { WindowEvent::decode(0x0401, WPARAM(0), LPARAM(0)) };
        assert_eq!(ev, None);
    }
}
