//! Mock hardware for host-side tests.

use std::sync::Mutex;

use lumaos_abi::{DescriptorTablePointer, Port};
use lumaos_lib::{HwAccess, TextOutput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwEvent {
    EnableInterrupts,
    DisableInterrupts,
    LoadGdt { size: u16, base: u32 },
    LoadIdt { size: u16, base: u32 },
}

/// Records every privileged operation instead of performing it.
pub struct MockHw {
    port_writes: Mutex<Vec<(u16, u8)>>,
    events: Mutex<Vec<HwEvent>>,
    read_value: u8,
}

impl MockHw {
    pub fn new() -> Self {
        Self {
            port_writes: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            read_value: 0,
        }
    }

    pub fn port_writes(&self) -> Vec<(u16, u8)> {
        self.port_writes.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<HwEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.port_writes.lock().unwrap().clear();
        self.events.lock().unwrap().clear();
    }
}

/// Log sink collecting everything written through klog.
pub struct CaptureSink {
    text: Mutex<String>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            text: Mutex::new(String::new()),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.lock().unwrap().contains(needle)
    }
}

impl TextOutput for CaptureSink {
    fn write_str(&self, text: &str) {
        self.text.lock().unwrap().push_str(text);
    }
}

impl HwAccess for MockHw {
    fn port_read(&self, _port: Port) -> u8 {
        self.read_value
    }

    fn port_write(&self, port: Port, value: u8) {
        self.port_writes.lock().unwrap().push((port.number(), value));
    }

    unsafe fn load_gdt(&self, pointer: DescriptorTablePointer) {
        self.events.lock().unwrap().push(HwEvent::LoadGdt {
            size: pointer.size,
            base: pointer.base,
        });
    }

    unsafe fn load_idt(&self, pointer: DescriptorTablePointer) {
        self.events.lock().unwrap().push(HwEvent::LoadIdt {
            size: pointer.size,
            base: pointer.base,
        });
    }

    fn enable_interrupts(&self) {
        self.events.lock().unwrap().push(HwEvent::EnableInterrupts);
    }

    fn disable_interrupts(&self) {
        self.events.lock().unwrap().push(HwEvent::DisableInterrupts);
    }
}
