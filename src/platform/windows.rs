//! Win32 host
//!
//! Shows the target surface in a plain top-level window. A window timer
//! paces the loop: each `WM_TIMER` dispatches due timers and frames and
//! invalidates the client area, and `WM_PAINT` blits the canvas with
//! `SetDIBitsToDevice`. The status line is mirrored into the window title.
//! F1 and F2 switch between the two applications.

use std::cell::RefCell;
use std::ffi::c_void;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, DIB_RGB_COLORS, EndPaint, InvalidateRect,
    PAINTSTRUCT, SetDIBitsToDevice,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW,
    DispatchMessageW, GetMessageW, IDC_ARROW, KillTimer, LoadCursorW, MSG, PostQuitMessage,
    RegisterClassW, SetTimer, SetWindowTextW, TranslateMessage, WINDOW_EX_STYLE, WM_CHAR,
    WM_DESTROY, WM_KEYDOWN, WM_PAINT, WM_SIZE, WM_TIMER, WNDCLASSW, WS_OVERLAPPEDWINDOW,
    WS_VISIBLE,
};
use windows::core::{HSTRING, w};

use crate::app::controller::{AppController, ModuleKind, STATUS_ID, TARGET_ID};
use crate::config::HostConfig;
use crate::input::KeyEvent;
use crate::platform::HostError;
use crate::ui::renderer::{FrameRenderer, pixmap_to_bgra};
use crate::ui::surface::{Surface, SurfaceRegistry};
use crate::ui::template::FileTemplates;

const FRAME_TIMER_ID: usize = 1;
const VK_F1: usize = 0x70;
const VK_F2: usize = 0x71;

struct WindowState {
    controller: AppController,
    started: Instant,
    title: String,
    failure: Option<HostError>,
}

thread_local! {
    static HOST: RefCell<Option<WindowState>> = const { RefCell::new(None) };
}

fn with_state<R>(f: impl FnOnce(&mut WindowState) -> R) -> Option<R> {
    HOST.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Opens the host window and pumps messages until it is closed
pub fn run(config: &HostConfig) -> Result<(), HostError> {
    config.validate()?;
    let font = config.load_font()?;

    let mut surfaces = SurfaceRegistry::new();
    surfaces.insert(Surface::new(TARGET_ID, config.width, config.height));
    surfaces.insert(Surface::new(STATUS_ID, config.width, 0));

    let mut controller = AppController::new(
        surfaces,
        Box::new(FileTemplates::new(&config.template_root)),
        FrameRenderer::new(font),
        config.settings(),
    );
    controller.select(config.module, config.template.as_deref(), Duration::ZERO)?;

    HOST.with(|cell| {
        *cell.borrow_mut() = Some(WindowState {
            controller,
            started: Instant::now(),
            title: String::new(),
            failure: None,
        })
    });

    let result = unsafe { pump(config) };

    let state = HOST.with(|cell| cell.borrow_mut().take());
    let failure = state.and_then(|mut state| {
        state.controller.shutdown(state.started.elapsed());
        state.failure
    });

    result?;
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

unsafe fn pump(config: &HostConfig) -> Result<(), HostError> {
    let class_name = w!("AppshelfHost");

    unsafe {
        let hinstance = GetModuleHandleW(None)?;

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc),
            hInstance: hinstance.into(),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            lpszClassName: class_name,
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(HostError::WindowClassRegistrationFailed);
        }

        // Size the frame so the client area matches the configured viewport
        let mut frame = RECT {
            left: 0,
            top: 0,
            right: config.width as i32,
            bottom: config.height as i32,
        };
        AdjustWindowRect(&mut frame, WS_OVERLAPPEDWINDOW, false)?;

        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("appshelf"),
            WS_OVERLAPPEDWINDOW | WS_VISIBLE,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            frame.right - frame.left,
            frame.bottom - frame.top,
            None,
            None,
            hinstance,
            None,
        );
        if hwnd.0 == 0 {
            return Err(HostError::WindowCreationFailed);
        }

        let period_ms = config.frame_period.as_millis().clamp(1, u32::MAX as u128) as u32;
        SetTimer(hwnd, FRAME_TIMER_ID, period_ms, None);
        info!(period_ms, "host window open");

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    Ok(())
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == FRAME_TIMER_ID => {
            let title = with_state(|state| {
                let now = state.started.elapsed();
                let result = state
                    .controller
                    .tick(now)
                    .and_then(|()| state.controller.frame(now));
                if let Err(err) = result {
                    error!(error = %err, "application failed");
                    state.failure = Some(err.into());
                }
                status_title(state)
            })
            .flatten();

            unsafe {
                if let Some(title) = title {
                    let _ = SetWindowTextW(hwnd, &HSTRING::from(title));
                }
                let _ = InvalidateRect(hwnd, None, false);
            }
            quit_on_failure();
            LRESULT(0)
        }
        WM_CHAR => {
            if let Some(key) = KeyEvent::from_char_code(wparam.0 as u32).char() {
                with_state(|state| {
                    let now = state.started.elapsed();
                    if let Err(err) = state.controller.key(now, key) {
                        error!(error = %err, "application failed");
                        state.failure = Some(err.into());
                    }
                });
            }
            quit_on_failure();
            LRESULT(0)
        }
        WM_KEYDOWN if wparam.0 == VK_F1 || wparam.0 == VK_F2 => {
            let module = if wparam.0 == VK_F1 {
                ModuleKind::Arkanoid
            } else {
                ModuleKind::PrimeCalculator
            };
            with_state(|state| {
                let now = state.started.elapsed();
                if let Err(err) = state.controller.select(module, None, now) {
                    warn!(error = %err, %module, "module switch failed");
                }
            });
            LRESULT(0)
        }
        WM_SIZE => {
            let width = (lparam.0 & 0xffff) as u32;
            let height = ((lparam.0 >> 16) & 0xffff) as u32;
            with_state(|state| {
                if let Some(target) = state.controller.surfaces().get(TARGET_ID) {
                    target.borrow_mut().set_client_size(width, height);
                }
            });
            LRESULT(0)
        }
        WM_PAINT => {
            unsafe {
                let mut ps = PAINTSTRUCT::default();
                let hdc = BeginPaint(hwnd, &mut ps);

                with_state(|state| {
                    let Some(target) = state.controller.surfaces().get(TARGET_ID) else {
                        return;
                    };
                    let target = target.borrow();
                    let Some(canvas) = target.canvas() else {
                        return;
                    };

                    let width = canvas.width() as i32;
                    let height = canvas.height() as i32;
                    let pixels = pixmap_to_bgra(canvas.pixmap());

                    let mut bitmap_info = BITMAPINFO::default();
                    bitmap_info.bmiHeader = BITMAPINFOHEADER {
                        biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                        biWidth: width,
                        biHeight: -height, // top-down rows, same order as the pixmap
                        biPlanes: 1,
                        biBitCount: 32,
                        biCompression: BI_RGB.0,
                        ..Default::default()
                    };

                    SetDIBitsToDevice(
                        hdc,
                        0,
                        0,
                        width as u32,
                        height as u32,
                        0,
                        0,
                        0,
                        height as u32,
                        pixels.as_ptr() as *const c_void,
                        &bitmap_info,
                        DIB_RGB_COLORS,
                    );
                });

                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe {
                let _ = KillTimer(hwnd, FRAME_TIMER_ID);
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Ends the message loop once the live application has failed
fn quit_on_failure() {
    if with_state(|state| state.failure.is_some()) == Some(true) {
        unsafe { PostQuitMessage(1) };
    }
}

/// New window title if the status line changed
fn status_title(state: &mut WindowState) -> Option<String> {
    let status = state
        .controller
        .surfaces()
        .get(STATUS_ID)
        .map(|status| status.borrow().text().to_owned())
        .unwrap_or_default();
    if status == state.title {
        return None;
    }
    state.title = status.clone();
    Some(format!("appshelf - {status}"))
}
