// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Process-wide signal state as a single word-sized atomic bitfield, the
// only thing safe to touch from an async-signal-safe handler. Raw
// libc::signal installation follows the same pattern as the demo binaries
// in this codebase (no closures registered with the libc handler itself;
// the handler only ever sets bits).

use std::sync::atomic::{AtomicU8, Ordering};

const FLUSH_REQUESTED: u8 = 0b01;
const TERMINATING: u8 = 0b10;

static STATE: AtomicU8 = AtomicU8::new(0);

/// Installs handlers for `SIGUSR1` (flush request), and `SIGTERM`/`SIGINT`
/// (termination request). Safe to call once at startup.
#[cfg(unix)]
pub fn install() {
    unsafe {
        libc::signal(libc::SIGUSR1, flush_handler as libc::sighandler_t);
        libc::signal(libc::SIGTERM, terminate_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, terminate_handler as libc::sighandler_t);
    }
}

#[cfg(unix)]
extern "C" fn flush_handler(_sig: libc::c_int) {
    STATE.fetch_or(FLUSH_REQUESTED, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn terminate_handler(_sig: libc::c_int) {
    STATE.fetch_or(TERMINATING, Ordering::SeqCst);
}

/// Returns true exactly once per pending flush request, clearing the bit.
pub fn take_flush_requested() -> bool {
    STATE.fetch_and(!FLUSH_REQUESTED, Ordering::SeqCst) & FLUSH_REQUESTED != 0
}

pub fn is_terminating() -> bool {
    STATE.load(Ordering::SeqCst) & TERMINATING != 0
}

/// Test-only: resets the shared signal state. Tests that drive the
/// handlers directly must not run concurrently with each other.
#[cfg(test)]
pub fn reset_for_test() {
    STATE.store(0, Ordering::SeqCst);
}
