//! Win32 window plumbing: class registration, the window/controller registry,
//! the wnd_proc, accelerators, the retry prompt, and the message loop.
//!
//! Controllers are looked up through a thread-local registry keyed by window
//! handle instead of the per-window user-data slot; messages arriving before
//! registration (or while the controller is already borrowed by an outer
//! handler) fall through to `DefWindowProcW`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use widestring::U16CString;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    ACCEL, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateAcceleratorTableW, CreateWindowExW,
    DefWindowProcW, DestroyAcceleratorTable, DispatchMessageW, FCONTROL, FVIRTKEY, GetMessageW,
    HACCEL, HWND_TOPMOST, IDC_SIZEALL, IDRETRY, LoadCursorW, MB_ICONERROR, MB_RETRYCANCEL, MSG,
    MessageBoxW, NCCALCSIZE_PARAMS, RegisterClassExW, SW_MINIMIZE, SW_SHOW, SWP_FRAMECHANGED,
    SWP_NOMOVE, SWP_NOREDRAW, SetWindowPos, ShowWindow, TranslateAcceleratorW, TranslateMessage,
    WINDOW_EX_STYLE, WM_NCCALCSIZE, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};
use windows::core::PCWSTR;

use crate::controller::PinController;
use crate::event::{CMD_CLOSE_WINDOW, EventOutcome, WindowEvent, rect_to_win};
use crate::geom::Size;
use crate::state::PromptChoice;

static PIN_CLASS: OnceCell<U16CString> = OnceCell::new();

thread_local! {
    static CONTROLLERS: RefCell<HashMap<isize, Rc<RefCell<PinController>>>> =
        RefCell::new(HashMap::new());
}

/// Make the controller reachable from the wnd_proc. Call before showing the
/// window so the first visible paint already finds it.
pub fn register_controller(hwnd: HWND, controller: Rc<RefCell<PinController>>) {
    CONTROLLERS.with(|map| {
        map.borrow_mut().insert(hwnd.0 as isize, controller);
    });
}

pub fn unregister_controller(hwnd: HWND) {
    CONTROLLERS.with(|map| {
        map.borrow_mut().remove(&(hwnd.0 as isize));
    });
}

fn controller_for(hwnd: HWND) -> Option<Rc<RefCell<PinController>>> {
    CONTROLLERS.with(|map| map.borrow().get(&(hwnd.0 as isize)).cloned())
}

fn register_pin_class() -> Result<&'static U16CString> {
    PIN_CLASS.get_or_try_init(|| {
        let name = U16CString::from_str("StickpinWindow")?;
        unsafe {
            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(pin_wnd_proc),
                hInstance: GetModuleHandleW(None)?.into(),
                // The whole client area is a drag handle; the class cursor
                // matches.
                hCursor: LoadCursorW(None, IDC_SIZEALL)?,
                lpszClassName: PCWSTR(name.as_ptr()),
                ..Default::default()
            };
            if RegisterClassExW(&wc) == 0 {
                return Err(anyhow!("RegisterClassExW failed"));
            }
        }
        Ok(name)
    })
}

/// Create the pin window hidden; it is shown only once an image is pinned.
pub fn create_pin_window(title: &str) -> Result<HWND> {
    let class = register_pin_class()?;
    let title_u16 = U16CString::from_str(title)?;
    unsafe {
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class.as_ptr()),
            PCWSTR(title_u16.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            200,
            200,
            None,
            None,
            None,
            None,
        )
        .context("CreateWindowExW failed")?;
        Ok(hwnd)
    }
}

/// Show the window always-on-top at the image's natural size, keeping the
/// default position. The frame change forces a non-client recalculation so
/// the border suppression takes effect immediately.
pub fn show_pinned(hwnd: HWND, size: Size) -> Result<()> {
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        SetWindowPos(
            hwnd,
            Some(HWND_TOPMOST),
            0,
            0,
            size.width as i32,
            size.height as i32,
            SWP_NOMOVE | SWP_FRAMECHANGED,
        )
        .context("SetWindowPos failed")?;
    }
    Ok(())
}

/// Modal retry/cancel prompt shown while the clipboard holds no image.
pub fn prompt_retry_cancel(hwnd: HWND) -> PromptChoice {
    let text = U16CString::from_str("No image in clipboard").unwrap();
    let caption = U16CString::from_str("Stickpin").unwrap();
    let ret = unsafe {
        MessageBoxW(
            Some(hwnd),
            PCWSTR(text.as_ptr()),
            PCWSTR(caption.as_ptr()),
            MB_ICONERROR | MB_RETRYCANCEL,
        )
    };
    if ret == IDRETRY {
        PromptChoice::Retry
    } else {
        PromptChoice::Cancel
    }
}

/// Accelerator table for the close command: Ctrl+W and Esc.
pub fn create_close_accelerators() -> Result<HACCEL> {
    const VK_W: u16 = b'W' as u16;
    const VK_ESCAPE: u16 = 0x1B;
    let accels = [
        ACCEL {
            fVirt: FCONTROL | FVIRTKEY,
            key: VK_W,
            cmd: CMD_CLOSE_WINDOW,
        },
        ACCEL {
            fVirt: FVIRTKEY,
            key: VK_ESCAPE,
            cmd: CMD_CLOSE_WINDOW,
        },
    ];
    unsafe { CreateAcceleratorTableW(&accels).context("CreateAcceleratorTableW failed") }
}

pub fn destroy_accelerators(haccel: HACCEL) {
    unsafe {
        let _ = DestroyAcceleratorTable(haccel);
    }
}

/// Standard GetMessage/Dispatch loop with accelerator translation, terminated
/// by WM_QUIT.
pub fn run_message_loop(hwnd: HWND, haccel: HACCEL) -> Result<()> {
    unsafe {
        let mut msg = MSG::default();
        loop {
            let r = GetMessageW(&mut msg, None, 0, 0);
            if r.0 == -1 {
                return Err(anyhow!("GetMessageW failed"));
            }
            if r.0 == 0 {
                return Ok(());
            }
            if TranslateAcceleratorW(hwnd, haccel, &msg) == 0 {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

unsafe extern "system" fn pin_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // Border suppression is pure message-shape plumbing, independent of
    // controller state: claim the full window rectangle as client area and
    // keep the frame from being redrawn.
    if msg == WM_NCCALCSIZE {
        if wparam.0 != 0 {
            unsafe {
                let params = lparam.0 as *mut NCCALCSIZE_PARAMS;
                if let Some(params) = params.as_mut() {
                    (*params.lppos).flags |= SWP_NOREDRAW;
                }
            }
        }
        return LRESULT(0);
    }

    let Some(controller) = controller_for(hwnd) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };
    let Some(event) = (unsafe { WindowEvent::decode(msg, wparam, lparam) }) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    let outcome = match controller.try_borrow_mut() {
        Ok(mut controller) => controller.handle_event(event),
        Err(_) => EventOutcome::Unhandled,
    };

    match outcome {
        EventOutcome::Result(value) => LRESULT(value),
        EventOutcome::Sizing(rect) => unsafe {
            let dest = lparam.0 as *mut RECT;
            if let Some(dest) = dest.as_mut() {
                *dest = rect_to_win(rect);
            }
            LRESULT(1)
        },
        // Performed here, after the controller borrow is released, because
        // minimizing synchronously delivers WM_SIZE back into this wnd_proc.
        EventOutcome::Minimize => unsafe {
            let _ = ShowWindow(hwnd, SW_MINIMIZE);
            LRESULT(0)
        },
        EventOutcome::Unhandled => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
