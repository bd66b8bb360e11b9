use crate::pets::monitor::MonitorRect;

pub fn bitmap_len(rect: MonitorRect) -> usize {
    (rect.width.max(0) as usize)
        .saturating_mul(rect.height.max(0) as usize)
        .saturating_mul(4)
}

#[cfg(windows)]
pub fn pump_overlay_messages() {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
    };

    unsafe {
        let mut msg = MSG::default();
        while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).into() {
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
}

#[cfg(not(windows))]
pub fn pump_overlay_messages() {}

#[cfg(windows)]
mod platform {
    use super::bitmap_len;
    use crate::pets::monitor::MonitorRect;
    use std::mem;
    use std::ptr;
    use std::sync::Once;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
    use windows::Win32::Graphics::Gdi::{
        CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, SelectObject, AC_SRC_ALPHA,
        AC_SRC_OVER, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS,
        HBITMAP, HDC, HGDIOBJ,
    };
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, RegisterClassW, SetWindowPos,
        UpdateLayeredWindow, HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
        SWP_SHOWWINDOW, ULW_ALPHA, WINDOW_EX_STYLE, WINDOW_STYLE, WM_ACTIVATE, WM_NCHITTEST,
        WM_SHOWWINDOW, WM_WINDOWPOSCHANGED, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
        WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
    };

    /// Click-through, always on top, absent from the taskbar, never activated.
    pub fn compose_overlay_window_ex_style() -> WINDOW_EX_STYLE {
        WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE
    }

    pub fn per_pixel_alpha_blend() -> BLENDFUNCTION {
        BLENDFUNCTION {
            BlendOp: AC_SRC_OVER as u8,
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: AC_SRC_ALPHA as u8,
        }
    }

    fn widestring(value: &str) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        std::ffi::OsStr::new(value)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    unsafe extern "system" fn overlay_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        const HTTRANSPARENT: isize = -1;
        match msg {
            WM_NCHITTEST => LRESULT(HTTRANSPARENT),
            WM_SHOWWINDOW | WM_ACTIVATE | WM_WINDOWPOSCHANGED => {
                let _ = unsafe {
                    SetWindowPos(
                        hwnd,
                        HWND_TOPMOST,
                        0,
                        0,
                        0,
                        0,
                        SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
                    )
                };
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    #[derive(Debug)]
    pub struct OverlayWindow {
        hwnd: HWND,
        mem_dc: HDC,
        dib: HBITMAP,
        old_bitmap: HGDIOBJ,
        bits: *mut u8,
        size_bytes: usize,
        monitor_rect: MonitorRect,
    }

    unsafe impl Send for OverlayWindow {}

    impl OverlayWindow {
        pub fn create_for_monitor(monitor_rect: MonitorRect) -> Option<Self> {
            static REGISTER_CLASS: Once = Once::new();
            let class_name = widestring("ScreenPetsOverlay");
            let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }.ok()?;

            REGISTER_CLASS.call_once(|| unsafe {
                let wc = WNDCLASSW {
                    hInstance: hinstance.into(),
                    lpszClassName: PCWSTR(class_name.as_ptr()),
                    lpfnWndProc: Some(overlay_wndproc),
                    ..Default::default()
                };
                let _ = RegisterClassW(&wc);
            });

            let hwnd = unsafe {
                CreateWindowExW(
                    compose_overlay_window_ex_style(),
                    PCWSTR(class_name.as_ptr()),
                    PCWSTR::null(),
                    WINDOW_STYLE(WS_POPUP.0),
                    monitor_rect.x,
                    monitor_rect.y,
                    monitor_rect.width,
                    monitor_rect.height,
                    None,
                    None,
                    hinstance,
                    None,
                )
                .ok()?
            };

            let mem_dc = unsafe { CreateCompatibleDC(HDC::default()) };
            if mem_dc.0.is_null() {
                unsafe {
                    let _ = DestroyWindow(hwnd);
                }
                return None;
            }

            let mut bmi = BITMAPINFO::default();
            bmi.bmiHeader = BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: monitor_rect.width,
                biHeight: -monitor_rect.height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut bits: *mut core::ffi::c_void = ptr::null_mut();
            let dib = match unsafe {
                CreateDIBSection(
                    mem_dc,
                    &bmi,
                    DIB_RGB_COLORS,
                    &mut bits,
                    windows::Win32::Foundation::HANDLE::default(),
                    0,
                )
            } {
                Ok(dib) => dib,
                Err(_) => {
                    unsafe {
                        let _ = DeleteDC(mem_dc);
                        let _ = DestroyWindow(hwnd);
                    }
                    return None;
                }
            };
            if bits.is_null() {
                unsafe {
                    let _ = DeleteObject(dib);
                    let _ = DeleteDC(mem_dc);
                    let _ = DestroyWindow(hwnd);
                }
                return None;
            }

            let old_bitmap = unsafe { SelectObject(mem_dc, dib) };

            Some(Self {
                hwnd,
                mem_dc,
                dib,
                old_bitmap,
                bits: bits as *mut u8,
                size_bytes: bitmap_len(monitor_rect),
                monitor_rect,
            })
        }

        pub fn monitor_rect(&self) -> MonitorRect {
            self.monitor_rect
        }

        pub fn show(&self) {
            unsafe {
                let _ = SetWindowPos(
                    self.hwnd,
                    HWND_TOPMOST,
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_SHOWWINDOW,
                );
            }
        }

        pub fn with_bitmap_mut<F>(&mut self, mut f: F)
        where
            F: FnMut(&mut [u8], u32, u32),
        {
            if self.bits.is_null() || self.size_bytes == 0 {
                return;
            }

            let pixels = unsafe { std::slice::from_raw_parts_mut(self.bits, self.size_bytes) };
            f(
                pixels,
                self.monitor_rect.width as u32,
                self.monitor_rect.height as u32,
            );
        }

        /// Pushes the DIB contents to the screen with per-pixel alpha.
        pub fn present(&self) -> windows::core::Result<()> {
            let position = POINT {
                x: self.monitor_rect.x,
                y: self.monitor_rect.y,
            };
            let size = SIZE {
                cx: self.monitor_rect.width,
                cy: self.monitor_rect.height,
            };
            let source = POINT::default();
            let blend = per_pixel_alpha_blend();
            unsafe {
                UpdateLayeredWindow(
                    self.hwnd,
                    HDC::default(),
                    Some(&position as *const POINT),
                    Some(&size as *const SIZE),
                    self.mem_dc,
                    Some(&source as *const POINT),
                    COLORREF(0),
                    Some(&blend as *const BLENDFUNCTION),
                    ULW_ALPHA,
                )
            }
        }

        pub fn shutdown(&mut self) {
            unsafe {
                if !self.mem_dc.0.is_null() {
                    let _ = SelectObject(self.mem_dc, self.old_bitmap);
                }
                if !self.dib.0.is_null() {
                    let _ = DeleteObject(self.dib);
                    self.dib = HBITMAP::default();
                }
                if !self.mem_dc.0.is_null() {
                    let _ = DeleteDC(self.mem_dc);
                    self.mem_dc = HDC::default();
                }
                if !self.hwnd.0.is_null() {
                    let _ = DestroyWindow(self.hwnd);
                    self.hwnd = HWND::default();
                }
                self.bits = ptr::null_mut();
                self.size_bytes = 0;
            }
        }
    }

    impl Drop for OverlayWindow {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

}

#[cfg(windows)]
pub use platform::OverlayWindow;

/// Headless stand-in: keeps an in-memory bitmap so the surface pipeline runs
/// unchanged.
#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct OverlayWindow {
    monitor_rect: MonitorRect,
    pixels: Vec<u8>,
    visible: bool,
    presented: usize,
}

#[cfg(not(windows))]
impl OverlayWindow {
    pub fn create_for_monitor(monitor_rect: MonitorRect) -> Option<Self> {
        if monitor_rect.width <= 0 || monitor_rect.height <= 0 {
            return None;
        }
        Some(Self {
            monitor_rect,
            pixels: vec![0; bitmap_len(monitor_rect)],
            visible: false,
            presented: 0,
        })
    }

    pub fn monitor_rect(&self) -> MonitorRect {
        self.monitor_rect
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn presented_frames(&self) -> usize {
        self.presented
    }

    pub fn with_bitmap_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut [u8], u32, u32),
    {
        let (width, height) = (
            self.monitor_rect.width as u32,
            self.monitor_rect.height as u32,
        );
        f(&mut self.pixels, width, height);
    }

    pub fn present(&mut self) -> std::io::Result<()> {
        self.presented += 1;
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.visible = false;
        self.pixels = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::bitmap_len;
    use crate::pets::monitor::MonitorRect;

    #[test]
    fn bitmap_len_is_four_bytes_per_pixel() {
        let rect = MonitorRect {
            x: -1920,
            y: 0,
            width: 1920,
            height: 1080,
        };
        assert_eq!(bitmap_len(rect), 1920 * 1080 * 4);
        assert_eq!(
            bitmap_len(MonitorRect {
                width: -5,
                ..rect
            }),
            0
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn headless_window_exposes_full_bitmap() {
        let rect = MonitorRect {
            x: 0,
            y: 0,
            width: 4,
            height: 3,
        };
        let mut window = super::OverlayWindow::create_for_monitor(rect).expect("window");
        let mut seen = (0, 0, 0);
        window.with_bitmap_mut(|pixels, width, height| seen = (pixels.len(), width, height));
        assert_eq!(seen, (48, 4, 3));

        window.show();
        assert!(window.is_visible());
        window.present().expect("present");
        assert_eq!(window.presented_frames(), 1);
        window.shutdown();
        assert!(!window.is_visible());
    }

    #[cfg(not(windows))]
    #[test]
    fn headless_window_rejects_empty_rect() {
        assert!(super::OverlayWindow::create_for_monitor(MonitorRect::default()).is_none());
    }
}
