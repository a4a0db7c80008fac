//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Two periodic timers drive the polling cadence (status tick, ranging
//! trigger request) and three one-shot timers implement the alarms
//! (feeder hatch phases, buzzer auto-off, echo watchdog).  Every callback
//! only raises a coalescing event cell — no I/O in timer context.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! the atomic cell writes are trivially safe there.

use crate::events::FeederAlarm;

#[cfg(target_os = "espidf")]
use crate::events;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut STATUS_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut TRIGGER_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut FEEDER_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut BUZZER_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ECHO_WD_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// Which feeder phase the pending one-shot will announce.  Written by
/// `arm_feeder_alarm` (main loop) strictly before the timer is started;
/// read by the callback.  The two-phase handoff guarantees only one
/// outstanding feeder timer, so writer and reader never overlap.
#[cfg(target_os = "espidf")]
static FEEDER_NEXT_PHASE: AtomicU8 = AtomicU8::new(0);

#[cfg(target_os = "espidf")]
unsafe extern "C" fn status_tick_cb(_arg: *mut core::ffi::c_void) {
    events::raise_status_tick();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trigger_tick_cb(_arg: *mut core::ffi::c_void) {
    events::raise_trigger_tick();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn feeder_alarm_cb(_arg: *mut core::ffi::c_void) {
    let phase = match FEEDER_NEXT_PHASE.load(Ordering::Acquire) {
        1 => FeederAlarm::CloseHatch,
        _ => FeederAlarm::Settled,
    };
    events::raise_feeder_alarm(phase);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn buzzer_off_cb(_arg: *mut core::ffi::c_void) {
    events::raise_buzzer_off();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn echo_wd_cb(_arg: *mut core::ffi::c_void) {
    events::raise_echo_timeout();
}

#[cfg(target_os = "espidf")]
unsafe fn create_timer(
    cb: unsafe extern "C" fn(*mut core::ffi::c_void),
    name: &'static [u8],
    out: *mut esp_timer_handle_t,
) -> bool {
    let args = esp_timer_create_args_t {
        callback: Some(cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr() as *const _,
        skip_unhandled_events: false,
    };
    // SAFETY: `out` points at one of the module statics, written once at
    // boot from the single main-task context.
    (unsafe { esp_timer_create(&args, out) }) == ESP_OK
}

/// Create every timer and start the two periodic ones.
///
/// * status tick — `status_period_ms` (500 ms reference cadence)
/// * ranging trigger request — `ranging_period_ms` (200 ms)
#[cfg(target_os = "espidf")]
pub fn start_timers(status_period_ms: u32, ranging_period_ms: u32) {
    // SAFETY: all handles are written here once at boot, before any
    // callback can fire; arm_* functions only run after this returns.
    unsafe {
        if !create_timer(status_tick_cb, b"status\0", &raw mut STATUS_TIMER)
            || !create_timer(trigger_tick_cb, b"trigger\0", &raw mut TRIGGER_TIMER)
            || !create_timer(feeder_alarm_cb, b"feeder\0", &raw mut FEEDER_TIMER)
            || !create_timer(buzzer_off_cb, b"buzzer\0", &raw mut BUZZER_TIMER)
            || !create_timer(echo_wd_cb, b"echo_wd\0", &raw mut ECHO_WD_TIMER)
        {
            log::error!("hw_timer: timer create failed — continuing without timers");
            return;
        }

        let ret = esp_timer_start_periodic(STATUS_TIMER, u64::from(status_period_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: status timer start failed (rc={})", ret);
            return;
        }
        let ret = esp_timer_start_periodic(TRIGGER_TIMER, u64::from(ranging_period_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: trigger timer start failed (rc={})", ret);
            return;
        }

        info!(
            "hw_timer: status@{}ms + trigger@{}ms started",
            status_period_ms, ranging_period_ms
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_status_period_ms: u32, _ranging_period_ms: u32) {
    log::info!("hw_timer(sim): timers not started (events driven by sleep loop)");
}

#[cfg(target_os = "espidf")]
unsafe fn restart_once(handle: esp_timer_handle_t, delay_ms: u32) {
    if handle.is_null() {
        return;
    }
    // SAFETY: stopping an expired one-shot returns ESP_ERR_INVALID_STATE,
    // which is the normal case here — alarms are never cancelled early,
    // only re-armed after they fired.
    unsafe {
        esp_timer_stop(handle);
        let ret = esp_timer_start_once(handle, u64::from(delay_ms) * 1000);
        if ret != ESP_OK {
            log::warn!("hw_timer: one-shot start failed (rc={})", ret);
        }
    }
}

/// Arm the feeder one-shot for the given phase.
#[cfg(target_os = "espidf")]
pub fn arm_feeder_alarm(phase: FeederAlarm, delay_ms: u32) {
    let raw = match phase {
        FeederAlarm::CloseHatch => 1,
        FeederAlarm::Settled => 2,
    };
    FEEDER_NEXT_PHASE.store(raw, Ordering::Release);
    // SAFETY: FEEDER_TIMER was created in start_timers().
    unsafe { restart_once(FEEDER_TIMER, delay_ms) };
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_feeder_alarm(_phase: FeederAlarm, _delay_ms: u32) {}

/// Arm the buzzer auto-off one-shot.
#[cfg(target_os = "espidf")]
pub fn arm_buzzer_off(delay_ms: u32) {
    // SAFETY: BUZZER_TIMER was created in start_timers().
    unsafe { restart_once(BUZZER_TIMER, delay_ms) };
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_buzzer_off(_delay_ms: u32) {}

/// Arm the echo watchdog one-shot.
#[cfg(target_os = "espidf")]
pub fn arm_echo_watchdog(delay_ms: u32) {
    // SAFETY: ECHO_WD_TIMER was created in start_timers().
    unsafe { restart_once(ECHO_WD_TIMER, delay_ms) };
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_echo_watchdog(_delay_ms: u32) {}
