//! Direct2D render surface and WIC image decode.
//!
//! `DecodedImage` is device-independent: the WIC format converter survives any
//! number of render-target losses. `RenderSurface` bundles everything tied to
//! one hwnd render target (the target, brushes, and the device-side copy of
//! the image), so discarding the surface on device loss discards all of it at
//! once. The controller holds the surface as an `Option` and recreates it from
//! exactly one place before painting.

use tracing::debug;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct2D::Common::{
    D2D1_COLOR_F, D2D_POINT_2F, D2D_RECT_F, D2D_SIZE_F, D2D_SIZE_U,
};
use windows::Win32::Graphics::Direct2D::{
    D2D1_ANTIALIAS_MODE_PER_PRIMITIVE, D2D1_BITMAP_INTERPOLATION_MODE_LINEAR,
    D2D1_HWND_RENDER_TARGET_PROPERTIES, D2D1_PRESENT_OPTIONS_NONE, D2D1_RENDER_TARGET_PROPERTIES,
    D2D1_WINDOW_STATE_OCCLUDED, D2DERR_RECREATE_TARGET, ID2D1Bitmap, ID2D1Factory,
    ID2D1HwndRenderTarget, ID2D1SolidColorBrush,
};
use windows::Win32::Graphics::Imaging::{
    GUID_WICPixelFormat32bppPBGRA, IWICFormatConverter, IWICImagingFactory,
    WICBitmapDitherTypeNone, WICBitmapPaletteTypeCustom, WICBitmapUseAlpha,
};
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;

use crate::chrome::{BUTTON_BORDER, BUTTON_SIZE};
use crate::clipboard::ClipboardBitmap;
use crate::error::PinError;
use crate::geom::Size;

/// Render targets are created at a fixed 96 DPI so one image pixel maps to
/// one desktop pixel under any system scaling.
const DEFAULT_DPI: f32 = 96.0;

const fn color(r: f32, g: f32, b: f32) -> D2D1_COLOR_F {
    D2D1_COLOR_F { r, g, b, a: 1.0 }
}

const WHITE: D2D1_COLOR_F = color(1.0, 1.0, 1.0);
const RED: D2D1_COLOR_F = color(1.0, 0.0, 0.0);
// 0x212121
const GREY: D2D1_COLOR_F = color(0x21 as f32 / 255.0, 0x21 as f32 / 255.0, 0x21 as f32 / 255.0);

/// Device-independent decode of the clipboard bitmap: a premultiplied-BGRA
/// format converter plus the natural pixel size.
pub struct DecodedImage {
    converter: IWICFormatConverter,
    size: Size,
}

impl DecodedImage {
    /// Copy the GDI bitmap into WIC and wrap it in a 32bpp PBGRA converter.
    /// Any decode failure, including a degenerate zero-sized bitmap, is
    /// reported as `NoImage` so the acquisition retry prompt covers it.
    pub fn from_clipboard_bitmap(
        wic: &IWICImagingFactory,
        bitmap: &ClipboardBitmap,
    ) -> Result<Self, PinError> {
        unsafe {
            let wic_bitmap = wic
                .CreateBitmapFromHBITMAP(bitmap.handle(), None, WICBitmapUseAlpha)
                .map_err(|_| PinError::NoImage)?;

            let mut width = 0u32;
            let mut height = 0u32;
            wic_bitmap
                .GetSize(&mut width, &mut height)
                .map_err(|_| PinError::NoImage)?;
            if width == 0 || height == 0 {
                return Err(PinError::NoImage);
            }

            let converter = wic.CreateFormatConverter().map_err(|_| PinError::NoImage)?;
            converter
                .Initialize(
                    &wic_bitmap,
                    &GUID_WICPixelFormat32bppPBGRA,
                    WICBitmapDitherTypeNone,
                    None,
                    0.0,
                    WICBitmapPaletteTypeCustom,
                )
                .map_err(|_| PinError::NoImage)?;

            Ok(Self {
                converter,
                size: Size::new(width, height),
            })
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Everything bound to one hwnd render target. Exactly one instance exists at
/// a time (or none, meaning "recreate before the next frame").
pub struct RenderSurface {
    target: ID2D1HwndRenderTarget,
    red: ID2D1SolidColorBrush,
    white: ID2D1SolidColorBrush,
    grey: ID2D1SolidColorBrush,
    /// Device-side upload of the decoded image; dropped with the surface on
    /// device loss and re-uploaded lazily on the next frame.
    bitmap: Option<ID2D1Bitmap>,
}

impl RenderSurface {
    /// Create a render target sized to the window's current client area,
    /// along with the brushes used for the button chrome.
    pub fn create(factory: &ID2D1Factory, hwnd: HWND) -> Result<Self, PinError> {
        unsafe {
            let mut rc = windows::Win32::Foundation::RECT::default();
            GetClientRect(hwnd, &mut rc).map_err(PinError::Render)?;

            let target_properties = D2D1_RENDER_TARGET_PROPERTIES {
                dpiX: DEFAULT_DPI,
                dpiY: DEFAULT_DPI,
                ..Default::default()
            };
            let hwnd_properties = D2D1_HWND_RENDER_TARGET_PROPERTIES {
                hwnd,
                pixelSize: D2D_SIZE_U {
                    width: (rc.right - rc.left) as u32,
                    height: (rc.bottom - rc.top) as u32,
                },
                presentOptions: D2D1_PRESENT_OPTIONS_NONE,
            };

            let target = factory
                .CreateHwndRenderTarget(&target_properties, &hwnd_properties)
                .map_err(PinError::Render)?;
            target.SetAntialiasMode(D2D1_ANTIALIAS_MODE_PER_PRIMITIVE);

            let red = target
                .CreateSolidColorBrush(&RED, None)
                .map_err(PinError::Render)?;
            let white = target
                .CreateSolidColorBrush(&WHITE, None)
                .map_err(PinError::Render)?;
            let grey = target
                .CreateSolidColorBrush(&GREY, None)
                .map_err(PinError::Render)?;

            debug!(
                width = rc.right - rc.left,
                height = rc.bottom - rc.top,
                "render target created"
            );

            Ok(Self {
                target,
                red,
                white,
                grey,
                bitmap: None,
            })
        }
    }

    /// Match the render target to a new client size. On failure the caller
    /// discards the surface; it is recreated on the next paint.
    pub fn resize(&self, size: Size) -> Result<(), PinError> {
        unsafe {
            self.target
                .Resize(&D2D_SIZE_U {
                    width: size.width,
                    height: size.height,
                })
                .map_err(PinError::Render)
        }
    }

    /// Draw one frame: the image scaled to the client area, plus the button
    /// chrome while the cursor hovers the button band. `Err(DeviceLost)` means
    /// the whole surface must be discarded and rebuilt.
    pub fn draw(&mut self, image: Option<&DecodedImage>, hover: bool) -> Result<(), PinError> {
        unsafe {
            if (self.target.CheckWindowState().0 & D2D1_WINDOW_STATE_OCCLUDED.0) != 0 {
                return Ok(());
            }

            self.target.BeginDraw();
            self.target.Clear(Some(&WHITE));

            let size = self.target.GetSize();

            if let Some(image) = image {
                // Re-upload after device loss; a failed upload just leaves
                // this frame without the image and is retried next frame.
                if self.bitmap.is_none() {
                    self.bitmap = self
                        .target
                        .CreateBitmapFromWicBitmap(&image.converter, None)
                        .ok();
                }
                if let Some(bitmap) = &self.bitmap {
                    self.target.DrawBitmap(
                        bitmap,
                        Some(&D2D_RECT_F {
                            left: 0.0,
                            top: 0.0,
                            right: size.width,
                            bottom: size.height,
                        }),
                        1.0,
                        D2D1_BITMAP_INTERPOLATION_MODE_LINEAR,
                        None,
                    );
                }
            }

            if hover {
                self.draw_button_chrome(size);
            }

            match self.target.EndDraw(None, None) {
                Ok(()) => Ok(()),
                Err(e) if e.code() == D2DERR_RECREATE_TARGET => {
                    debug!("render target reported device loss");
                    Err(PinError::DeviceLost)
                }
                Err(e) => Err(PinError::Render(e)),
            }
        }
    }

    /// Close box: red square, white cross. Minimize box: grey square, white
    /// dash. Geometry mirrors the hit-test band exactly.
    fn draw_button_chrome(&self, size: D2D_SIZE_F) {
        let btn = BUTTON_SIZE as f32;
        let pad = BUTTON_BORDER as f32;
        unsafe {
            self.target.FillRectangle(
                &D2D_RECT_F {
                    left: size.width - btn,
                    top: 0.0,
                    right: size.width,
                    bottom: btn,
                },
                &self.red,
            );
            self.target.DrawLine(
                D2D_POINT_2F {
                    x: size.width - btn + pad,
                    y: pad,
                },
                D2D_POINT_2F {
                    x: size.width - pad,
                    y: btn - pad,
                },
                &self.white,
                1.0,
                None,
            );
            self.target.DrawLine(
                D2D_POINT_2F {
                    x: size.width - pad,
                    y: pad,
                },
                D2D_POINT_2F {
                    x: size.width - btn + pad,
                    y: btn - pad,
                },
                &self.white,
                1.0,
                None,
            );

            self.target.FillRectangle(
                &D2D_RECT_F {
                    left: size.width - 2.0 * btn,
                    top: 0.0,
                    right: size.width - btn,
                    bottom: btn,
                },
                &self.grey,
            );
            self.target.DrawLine(
                D2D_POINT_2F {
                    x: size.width - 2.0 * btn + pad,
                    y: btn / 2.0,
                },
                D2D_POINT_2F {
                    x: size.width - btn - pad,
                    y: btn / 2.0,
                },
                &self.white,
                1.0,
                None,
            );
        }
    }
}
