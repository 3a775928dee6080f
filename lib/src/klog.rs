//! Kernel logging with a runtime-selectable level and a pluggable sink.
//!
//! The sink is whatever [`TextOutput`] got attached; until one is attached
//! every message is dropped. Messages are written line-at-a-time.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use spin::Mutex;

use crate::console::{LineBuf, TextOutput};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => KlogLevel::Error,
            1 => KlogLevel::Warn,
            2 => KlogLevel::Info,
            3 => KlogLevel::Debug,
            _ => KlogLevel::Trace,
        }
    }
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::Info as u8);
static SINK: Mutex<Option<&'static dyn TextOutput>> = Mutex::new(None);

#[inline(always)]
fn is_enabled(level: KlogLevel) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

pub fn klog_set_sink(sink: &'static dyn TextOutput) {
    *SINK.lock() = Some(sink);
}

pub fn klog_set_level(level: KlogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

pub fn klog_is_enabled(level: KlogLevel) -> bool {
    is_enabled(level)
}

pub fn log_args(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    let sink = *SINK.lock();
    let Some(sink) = sink else {
        return;
    };
    let mut line = LineBuf::<256>::new();
    let _ = fmt::write(&mut line, args);
    sink.write_str(line.as_str());
    sink.write_str("\n");
}

#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        $crate::klog::log_args($level, ::core::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Error, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Warn, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Info, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Debug, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_trace {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Trace, ::core::format_args!($($arg)*))
    };
}

// ==== tests ================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct CaptureSink {
        lines: std::sync::Mutex<String>,
    }

    impl TextOutput for CaptureSink {
        fn write_str(&self, text: &str) {
            self.lines.lock().unwrap().push_str(text);
        }
    }

    #[test]
    fn level_round_trips() {
        let before = klog_get_level();
        klog_set_level(KlogLevel::Trace);
        assert_eq!(klog_get_level(), KlogLevel::Trace);
        assert!(klog_is_enabled(KlogLevel::Debug));
        klog_set_level(before);
    }

    #[test]
    fn sink_receives_formatted_line() {
        let sink: &'static CaptureSink = Box::leak(Box::new(CaptureSink {
            lines: std::sync::Mutex::new(String::new()),
        }));
        klog_set_sink(sink);
        klog_error!("bad vector 0x{:02X}", 0x2Cu8);
        assert!(sink.lines.lock().unwrap().contains("bad vector 0x2C\n"));
    }
}
