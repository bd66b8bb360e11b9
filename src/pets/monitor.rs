use crate::pets::geometry::{Point, Rect};

/// Monitor rectangle in desktop coordinates (origin top-left of the primary
/// monitor, Y down), as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One attached display. `frame` uses the native convention: origin
/// bottom-left, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFrame {
    pub frame: Rect,
    pub is_primary: bool,
}

impl DisplayFrame {
    pub fn new(x: f64, y: f64, width: f64, height: f64, is_primary: bool) -> Self {
        Self {
            frame: Rect::new(x, y, width, height),
            is_primary,
        }
    }

    pub fn from_monitor_rect(rect: MonitorRect, is_primary: bool) -> Self {
        Self::new(
            rect.x as f64,
            -(rect.y as f64 + rect.height as f64),
            rect.width as f64,
            rect.height as f64,
            is_primary,
        )
    }

    pub fn monitor_rect(&self) -> MonitorRect {
        MonitorRect {
            x: self.frame.min_x().round() as i32,
            y: (-self.frame.max_y()).round() as i32,
            width: self.frame.width.round() as i32,
            height: self.frame.height.round() as i32,
        }
    }
}

/// Ordered display list plus the primary designation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    displays: Vec<DisplayFrame>,
}

impl DisplayList {
    pub fn new(displays: Vec<DisplayFrame>) -> Self {
        Self { displays }
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayFrame> {
        self.displays.iter()
    }

    /// The flagged primary display, or the first one when nothing is flagged.
    pub fn primary_index(&self) -> Option<usize> {
        if self.displays.is_empty() {
            return None;
        }
        Some(
            self.displays
                .iter()
                .position(|d| d.is_primary)
                .unwrap_or(0),
        )
    }

    pub fn secondaries(&self) -> impl Iterator<Item = &DisplayFrame> {
        let primary = self.primary_index();
        self.displays
            .iter()
            .enumerate()
            .filter(move |(idx, _)| Some(*idx) != primary)
            .map(|(_, display)| display)
    }

    /// Union bounding box in native coordinates.
    pub fn native_union(&self) -> Option<Rect> {
        union_of(self.displays.iter())
    }

    /// Canvas origin expressed in native coordinates: minimum X, maximum Y.
    pub fn canvas_origin(&self) -> Option<Point> {
        let union = self.native_union()?;
        Some(Point::new(union.min_x(), union.max_y()))
    }

    /// Top-left of `display` in global canvas space.
    pub fn surface_offset(&self, display: &DisplayFrame) -> Point {
        match self.canvas_origin() {
            Some(origin) => Point::new(
                display.frame.min_x() - origin.x,
                origin.y - display.frame.max_y(),
            ),
            None => Point::ZERO,
        }
    }
}

pub fn union_of<'a>(displays: impl Iterator<Item = &'a DisplayFrame>) -> Option<Rect> {
    displays.map(|d| d.frame).reduce(|acc, frame| acc.union(&frame))
}

/// Supplies the current display topology.
pub trait DisplaySource: Send {
    fn displays(&self) -> DisplayList;
}

impl DisplaySource for DisplayList {
    fn displays(&self) -> DisplayList {
        self.clone()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDisplays;

impl DisplaySource for SystemDisplays {
    fn displays(&self) -> DisplayList {
        DisplayList::new(
            enumerate_monitors()
                .into_iter()
                .map(|(rect, primary)| DisplayFrame::from_monitor_rect(rect, primary))
                .collect(),
        )
    }
}

#[cfg(windows)]
fn enumerate_monitors() -> Vec<(MonitorRect, bool)> {
    use std::mem;
    use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFOEXW,
        MONITORINFOF_PRIMARY,
    };

    extern "system" fn monitor_enum_proc(
        monitor: HMONITOR,
        _hdc: HDC,
        _rc_clip: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let monitors = unsafe { &mut *(data.0 as *mut Vec<(MonitorRect, bool)>) };
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;
        if unsafe { GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut _ as *mut _) }.as_bool()
        {
            let rc = info.monitorInfo.rcMonitor;
            let primary = info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0;
            monitors.push((
                MonitorRect {
                    x: rc.left,
                    y: rc.top,
                    width: rc.right - rc.left,
                    height: rc.bottom - rc.top,
                },
                primary,
            ));
        }
        BOOL(1)
    }

    let mut monitors = Vec::new();
    unsafe {
        let _ = EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(monitor_enum_proc),
            LPARAM(&mut monitors as *mut Vec<(MonitorRect, bool)> as isize),
        );
    }
    monitors
}

#[cfg(not(windows))]
fn enumerate_monitors() -> Vec<(MonitorRect, bool)> {
    Vec::new()
}
