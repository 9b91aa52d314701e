//! Windows keyboard listener via WH_KEYBOARD_LL (low-level keyboard hook).
//!
//! `HookCapture` implements `InputCapture`. `start()` spawns a background thread
//! that installs the hook and runs a `GetMessageW` loop (required for low-level
//! hooks to deliver events). `stop()` posts `WM_QUIT` to exit the message loop
//! and joins the thread, which unhooks on its way out.
//!
//! Key state is not cached here: `GetAsyncKeyState` already reflects the
//! global keyboard state at the moment of the call, so `source()` returns a
//! live query. The hook only keeps the listener channel alive and traces
//! physical transitions.
//!
//! Feedback loop prevention: events carrying `LLKHF_INJECTED` or our
//! `INJECTED_MARKER` are passed through untouched.
//!
//! Single instance: hook procs receive no user pointer, so only one
//! `HookCapture` may be active per process. `start()` claims a process-global
//! flag and fails with `PlatformError::AlreadyActive` if it is taken.

use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use windows_sys::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HC_ACTION, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP,
    WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::keycodes::{to_vk, INJECTED_MARKER};
use crate::key::Key;
use crate::platform::{InputCapture, PlatformError, StateSource};

// ---------------------------------------------------------------------------
// Process-global hook ownership
// ---------------------------------------------------------------------------

/// Set while a `HookCapture` owns the keyboard hook.
static HOOK_ACTIVE: AtomicBool = AtomicBool::new(false);

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Windows capture backend using `WH_KEYBOARD_LL` plus `GetAsyncKeyState`.
pub struct HookCapture {
    /// Thread ID of the message-loop thread; target of `PostThreadMessageW`.
    thread_id: u32,
    thread: Option<JoinHandle<()>>,
}

impl HookCapture {
    pub fn new() -> Self {
        Self {
            thread_id: 0,
            thread: None,
        }
    }
}

impl InputCapture for HookCapture {
    fn start(&mut self) -> Result<(), PlatformError> {
        if self.thread.is_some() {
            return Ok(());
        }

        if HOOK_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PlatformError::AlreadyActive);
        }

        // Background thread reports its thread id once the hook is installed.
        let (info_tx, info_rx) = mpsc::channel::<Result<u32, PlatformError>>();

        let spawned = thread::Builder::new()
            .name("crossinput-hook".into())
            .spawn(move || {
                let hook =
                    unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), ptr::null_mut(), 0) };

                if hook.is_null() {
                    let _ = info_tx.send(Err(PlatformError::Other(format!(
                        "SetWindowsHookExW failed: {}",
                        std::io::Error::last_os_error()
                    ))));
                    return;
                }

                let _ = info_tx.send(Ok(unsafe { GetCurrentThreadId() }));
                log::info!("capture: WH_KEYBOARD_LL hook active");

                // Returns 0 on WM_QUIT, -1 on error; both exit the loop.
                unsafe {
                    let mut msg: MSG = std::mem::zeroed();
                    while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {}
                }

                unsafe { UnhookWindowsHookEx(hook) };
                log::info!("capture: hook removed, message loop exited");
            });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                HOOK_ACTIVE.store(false, Ordering::Release);
                return Err(PlatformError::Io(e));
            }
        };

        match info_rx.recv() {
            Ok(Ok(thread_id)) => {
                self.thread_id = thread_id;
                self.thread = Some(thread);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                HOOK_ACTIVE.store(false, Ordering::Release);
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                HOOK_ACTIVE.store(false, Ordering::Release);
                Err(PlatformError::Other(
                    "hook thread exited before reporting status".into(),
                ))
            }
        }
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        if self.thread_id != 0 {
            unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, 0, 0) };
            self.thread_id = 0;
        }

        let joined = thread.join();
        HOOK_ACTIVE.store(false, Ordering::Release);
        joined.map_err(|_| PlatformError::Other("hook thread panicked".into()))
    }

    fn source(&self) -> StateSource {
        StateSource::Live(query_key_state)
    }
}

impl Drop for HookCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ---------------------------------------------------------------------------
// Live state query
// ---------------------------------------------------------------------------

/// High bit of `GetAsyncKeyState` is set while the key is down.
fn query_key_state(key: Key) -> bool {
    let state = unsafe { GetAsyncKeyState(i32::from(to_vk(key))) };
    (state as u16) & 0x8000 != 0
}

// ---------------------------------------------------------------------------
// Hook procedure
// ---------------------------------------------------------------------------

/// Low-level keyboard hook proc, called on the message-loop thread.
///
/// Never suppresses: every event is chained to the next hook.
unsafe extern "system" fn hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        let kb = &*(l_param as *const KBDLLHOOKSTRUCT);
        let injected = kb.flags & LLKHF_INJECTED != 0 || kb.dwExtraInfo == INJECTED_MARKER;

        if !injected {
            let transition = match w_param as u32 {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some("down"),
                WM_KEYUP | WM_SYSKEYUP => Some("up"),
                _ => None,
            };
            if let Some(transition) = transition {
                let key = Key::from_code(kb.vkCode as u16);
                log::trace!("capture: {key:?} {transition}");
            }
        }
    }

    CallNextHookEx(ptr::null_mut(), n_code, w_param, l_param)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
