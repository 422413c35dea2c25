//! Clipboard image source.
//!
//! Yields the CF_BITMAP handle currently on the clipboard, or `NoImage` when
//! the clipboard cannot be opened or holds no bitmap. Partial data never
//! escapes: every failure collapses to the same recoverable error so the
//! caller's retry prompt covers all of them.

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{DeleteObject, HBITMAP, HGDIOBJ};
use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
use windows::Win32::System::Ole::CF_BITMAP;

use crate::error::PinError;

/// Owned GDI bitmap taken from the clipboard. The handle is released when the
/// value is dropped, which must happen only after the pixels were copied into
/// a device-independent image.
pub struct ClipboardBitmap {
    handle: HBITMAP,
}

impl ClipboardBitmap {
    pub fn handle(&self) -> HBITMAP {
        self.handle
    }
}

impl Drop for ClipboardBitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.handle.0));
        }
    }
}

/// Read the current CF_BITMAP clipboard content, if any.
pub fn read_clipboard_bitmap(hwnd: HWND) -> Result<ClipboardBitmap, PinError> {
    unsafe {
        OpenClipboard(Some(hwnd)).map_err(|_| PinError::NoImage)?;
        let data = GetClipboardData(CF_BITMAP.0 as u32);
        let _ = CloseClipboard();

        let handle = data.map_err(|_| PinError::NoImage)?;
        if handle.is_invalid() {
            return Err(PinError::NoImage);
        }
        Ok(ClipboardBitmap {
            handle: HBITMAP(handle.0),
        })
    }
}
