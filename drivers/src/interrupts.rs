//! Per-vector interrupt dispatch.
//!
//! `InterruptManager` owns a 256-slot handler registry and programs the IDT
//! it was given: every vector gets a gate, vectors nobody observes point at
//! the ignore stub. The asm entry path funnels through [`ACTIVE_MANAGER`],
//! a single cell holding at most one manager at a time.

use core::fmt::Write;
use core::ptr::NonNull;

use spin::Mutex;

use lumaos_abi::arch::x86::idt::{IDT_ENTRIES, TIMER_VECTOR};
use lumaos_abi::{GateDescriptor, GateType, SegmentSelector};
use lumaos_boot::{Idt, StubTable};
use lumaos_lib::{HwAccess, LineBuf, TextOutput, klog_debug};

use crate::pic::Pic8259;

/// An observer for one interrupt vector.
pub trait InterruptHandler: Sync {
    /// Receives the stack pointer of the saved frame and returns the stack
    /// pointer execution resumes on. The default keeps the current stack.
    fn handle_interrupt(&self, esp: u32) -> u32 {
        esp
    }
}

type HandlerSlot<'a> = Option<&'a dyn InterruptHandler>;

pub struct InterruptManager<'a> {
    hw: &'a dyn HwAccess,
    pic: Pic8259<'a>,
    idt: &'a Idt,
    output: &'a dyn TextOutput,
    handlers: Mutex<[HandlerSlot<'a>; IDT_ENTRIES]>,
    active_in: Mutex<Option<&'a ActiveSlot>>,
}

impl<'a> InterruptManager<'a> {
    /// Program a gate for every vector into `idt` and re-initialize the
    /// 8259 pair. Diagnostics for unobserved vectors go to `output`. The
    /// table is not handed to the CPU here; see [`InterruptManager::load`].
    pub fn new(
        hw: &'a dyn HwAccess,
        idt: &'a Idt,
        code_selector: SegmentSelector,
        stubs: StubTable,
        output: &'a dyn TextOutput,
    ) -> Self {
        for vector in 0..=255u8 {
            idt.set_entry(
                vector,
                GateDescriptor::new(stubs.stub_for(vector), code_selector, 0, GateType::Interrupt),
            );
        }
        let pic = Pic8259::new(hw);
        pic.remap();
        Self {
            hw,
            pic,
            idt,
            output,
            handlers: Mutex::new([None; IDT_ENTRIES]),
            active_in: Mutex::new(None),
        }
    }

    /// Hand the programmed IDT to the CPU.
    ///
    /// # Safety
    /// The table must stay alive and in place for as long as the CPU may
    /// take an interrupt through it.
    pub unsafe fn load(&self) {
        unsafe { self.idt.load(self.hw) };
    }

    /// Install `handler` as the observer for `vector`, displacing any
    /// previous observer. The returned guard removes the handler again on
    /// drop, unless the vector has been taken over in the meantime.
    pub fn register_handler<'m>(
        &'m self,
        vector: u8,
        handler: &'a dyn InterruptHandler,
    ) -> HandlerRegistration<'m, 'a> {
        self.handlers.lock()[vector as usize] = Some(handler);
        HandlerRegistration {
            manager: self,
            vector,
            handler,
        }
    }

    fn release_handler(&self, vector: u8, handler: &'a dyn InterruptHandler) {
        let mut handlers = self.handlers.lock();
        if let Some(current) = handlers[vector as usize] {
            if core::ptr::addr_eq(current as *const dyn InterruptHandler, handler) {
                handlers[vector as usize] = None;
            }
        }
    }

    /// Route one interrupt: run the registered handler if there is one,
    /// then acknowledge the controller for hardware vectors. Unobserved
    /// vectors are reported, except the timer which fires constantly.
    pub fn handle_interrupt(&self, vector: u8, esp: u32) -> u32 {
        let handler = self.handlers.lock()[vector as usize];
        let esp = match handler {
            Some(handler) => handler.handle_interrupt(esp),
            None => {
                if vector != TIMER_VECTOR {
                    let mut line = LineBuf::<32>::new();
                    let _ = write!(line, "UNHANDLED INTERRUPT 0x{vector:02X}");
                    self.output.write_str(line.as_str());
                }
                esp
            }
        };
        self.pic.end_of_interrupt(vector);
        esp
    }

    /// Make this manager the dispatch target of `slot` and enable
    /// interrupts. A previously active manager is displaced without the
    /// interrupt flag ever being cleared.
    ///
    /// # Safety
    /// The manager must not move and must not be leaked while it is the
    /// active one; dropping it deactivates cleanly.
    pub unsafe fn activate(&self, slot: &'a ActiveSlot) {
        slot.install(NonNull::from(self).cast());
        *self.active_in.lock() = Some(slot);
        klog_debug!("interrupts: manager activated");
        self.hw.enable_interrupts();
    }

    /// Stop dispatching through this manager and disable interrupts. A
    /// manager that has already been displaced does nothing, in particular
    /// it does not touch the interrupt flag.
    pub fn deactivate(&self) {
        let slot = self.active_in.lock().take();
        if let Some(slot) = slot {
            if slot.clear_if_current(self) {
                klog_debug!("interrupts: manager deactivated");
                self.hw.disable_interrupts();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        match *self.active_in.lock() {
            Some(slot) => slot.is_current(self),
            None => false,
        }
    }
}

impl Drop for InterruptManager<'_> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Owns one vector registration. Dropping it removes the handler, unless a
/// later registration already took the vector over.
#[must_use = "dropping the registration removes the handler"]
pub struct HandlerRegistration<'m, 'a> {
    manager: &'m InterruptManager<'a>,
    vector: u8,
    handler: &'a dyn InterruptHandler,
}

impl HandlerRegistration<'_, '_> {
    pub fn vector(&self) -> u8 {
        self.vector
    }
}

impl Drop for HandlerRegistration<'_, '_> {
    fn drop(&mut self) {
        self.manager.release_handler(self.vector, self.handler);
    }
}

/// Cell holding the manager interrupts currently dispatch through.
pub struct ActiveSlot {
    current: Mutex<Option<NonNull<InterruptManager<'static>>>>,
}

// The pointer is only installed by `InterruptManager::activate`, whose
// contract keeps the pointee alive and in place until deactivation.
unsafe impl Send for ActiveSlot {}
unsafe impl Sync for ActiveSlot {}

impl ActiveSlot {
    pub const fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn install(&self, manager: NonNull<InterruptManager<'static>>) {
        *self.current.lock() = Some(manager);
    }

    fn clear_if_current(&self, manager: &InterruptManager<'_>) -> bool {
        let mut current = self.current.lock();
        match *current {
            Some(ptr) if core::ptr::addr_eq(ptr.as_ptr(), manager) => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    fn is_current(&self, manager: &InterruptManager<'_>) -> bool {
        match *self.current.lock() {
            Some(ptr) => core::ptr::addr_eq(ptr.as_ptr(), manager),
            None => false,
        }
    }

    /// Route one interrupt to the active manager; with none active the
    /// stack pointer passes through untouched.
    pub fn dispatch(&self, vector: u8, esp: u32) -> u32 {
        let current = *self.current.lock();
        match current {
            Some(manager) => unsafe { manager.as_ref() }.handle_interrupt(vector, esp),
            None => esp,
        }
    }
}

impl Default for ActiveSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The cell the assembly entry path dispatches through.
pub static ACTIVE_MANAGER: ActiveSlot = ActiveSlot::new();

/// Called by the interrupt stubs with the vector and the stack pointer of
/// the saved frame; returns the stack pointer to resume on.
#[unsafe(no_mangle)]
pub extern "C" fn interrupt_entry(vector: u8, esp: u32) -> u32 {
    ACTIVE_MANAGER.dispatch(vector, esp)
}

// ==== tests ================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use lumaos_abi::arch::x86::idt::KEYBOARD_VECTOR;
    use lumaos_boot::GlobalDescriptorTable;

    use crate::test_support::{CaptureSink, HwEvent, MockHw};

    fn stubs() -> StubTable {
        StubTable {
            ignore: 0x1000,
            timer: 0x2000,
            keyboard: 0x3000,
            mouse: 0x4000,
        }
    }

    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl InterruptHandler for CountingHandler {
        fn handle_interrupt(&self, esp: u32) -> u32 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            esp
        }
    }

    struct PassiveHandler;

    impl InterruptHandler for PassiveHandler {}

    #[test]
    fn new_programs_a_gate_for_every_vector() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        for vector in 0..=255u8 {
            let gate = idt.entry(vector);
            assert!(gate.is_present());
            assert_eq!(gate.selector().bits(), 16);
            assert_eq!(gate.privilege(), 0);
            assert_eq!(gate.type_bits(), 0xE);
            assert_eq!(gate.handler(), stubs().stub_for(vector));
        }
        drop(manager);
    }

    #[test]
    fn new_remaps_the_pic() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let _manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        let writes = hw.port_writes();
        assert_eq!(writes.len(), 10);
        assert_eq!(writes[0], (0x20, 0x11));
        assert_eq!(writes[1], (0xA0, 0x11));
    }

    #[test]
    fn load_hands_the_idt_to_the_cpu() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        unsafe { manager.load() };
        assert!(matches!(
            hw.events().as_slice(),
            [HwEvent::LoadIdt { size: 2047, .. }]
        ));
    }

    #[test]
    fn registered_handler_observes_its_vector() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let handler = CountingHandler::new();
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        hw.clear();

        let registration = manager.register_handler(0x21, &handler);
        assert_eq!(registration.vector(), 0x21);
        assert_eq!(manager.handle_interrupt(0x21, 0xCAFE), 0xCAFE);
        assert_eq!(handler.calls(), 1);
        assert_eq!(hw.port_writes(), vec![(0x20, 0x20)]);
        drop(registration);
    }

    #[test]
    fn default_handler_keeps_the_stack_pointer() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let handler = PassiveHandler;
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        hw.clear();

        let _registration = manager.register_handler(0x2C, &handler);
        assert_eq!(manager.handle_interrupt(0x2C, 0x1234), 0x1234);
        // Slave vector, so both controllers get acknowledged.
        assert_eq!(hw.port_writes(), vec![(0xA0, 0x20), (0x20, 0x20)]);
    }

    #[test]
    fn later_registration_displaces_earlier_one() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let first = CountingHandler::new();
        let second = CountingHandler::new();
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);

        let first_registration = manager.register_handler(0x21, &first);
        let second_registration = manager.register_handler(0x21, &second);
        manager.handle_interrupt(0x21, 0);
        assert_eq!(first.calls(), 0);
        assert_eq!(second.calls(), 1);

        // The displaced guard no longer owns the vector, so dropping it
        // must leave the current handler in place.
        drop(first_registration);
        manager.handle_interrupt(0x21, 0);
        assert_eq!(second.calls(), 2);

        drop(second_registration);
        manager.handle_interrupt(0x21, 0);
        assert_eq!(second.calls(), 2);
    }

    #[test]
    fn unobserved_vectors_are_reported_except_the_timer() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let out = CaptureSink::new();
        let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        hw.clear();

        assert_eq!(manager.handle_interrupt(0x05, 7), 7);
        assert!(out.contains("UNHANDLED INTERRUPT 0x05"));
        // Software trap, so no controller acknowledgment.
        assert!(hw.port_writes().is_empty());

        // Cascade-routed IRQ line: reported and acknowledged on both chips.
        assert_eq!(manager.handle_interrupt(0x29, 7), 7);
        assert!(out.contains("UNHANDLED INTERRUPT 0x29"));
        assert_eq!(hw.port_writes(), vec![(0xA0, 0x20), (0x20, 0x20)]);

        assert_eq!(manager.handle_interrupt(0x20, 7), 7);
        assert!(!out.contains("UNHANDLED INTERRUPT 0x20"));
    }

    #[test]
    fn activation_hands_over_without_clearing_the_interrupt_flag() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let slot = ActiveSlot::new();
        let out = CaptureSink::new();
        let first = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        let second = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
        hw.clear();

        unsafe { first.activate(&slot) };
        assert!(first.is_active());
        unsafe { second.activate(&slot) };
        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(
            hw.events(),
            vec![HwEvent::EnableInterrupts, HwEvent::EnableInterrupts]
        );

        // The displaced manager no longer owns the slot.
        first.deactivate();
        assert!(second.is_active());
        assert_eq!(
            hw.events(),
            vec![HwEvent::EnableInterrupts, HwEvent::EnableInterrupts]
        );

        second.deactivate();
        assert!(!second.is_active());
        assert_eq!(
            hw.events(),
            vec![
                HwEvent::EnableInterrupts,
                HwEvent::EnableInterrupts,
                HwEvent::DisableInterrupts
            ]
        );
    }

    #[test]
    fn dropping_the_active_manager_deactivates() {
        let hw = MockHw::new();
        let idt = Idt::new();
        let slot = ActiveSlot::new();
        let out = CaptureSink::new();
        {
            let manager = InterruptManager::new(&hw, &idt, SegmentSelector::new(16), stubs(), &out);
            hw.clear();
            unsafe { manager.activate(&slot) };
        }
        assert_eq!(
            hw.events(),
            vec![HwEvent::EnableInterrupts, HwEvent::DisableInterrupts]
        );
        assert_eq!(slot.dispatch(0x21, 5), 5);
    }

    #[test]
    fn dispatch_without_active_manager_passes_through() {
        let slot = ActiveSlot::new();
        assert_eq!(slot.dispatch(0x21, 0xBEEF), 0xBEEF);
    }

    #[test]
    fn full_bring_up_path() {
        let hw = MockHw::new();
        let gdt = GlobalDescriptorTable::new();
        let idt = Idt::new();
        let slot = ActiveSlot::new();
        let out = CaptureSink::new();
        let handler = CountingHandler::new();

        unsafe { gdt.load(&hw) };
        let manager = InterruptManager::new(&hw, &idt, gdt.code_selector(), stubs(), &out);
        unsafe { manager.load() };
        let _registration = manager.register_handler(KEYBOARD_VECTOR, &handler);
        unsafe { manager.activate(&slot) };

        let events = hw.events();
        assert!(matches!(events[0], HwEvent::LoadGdt { size: 31, .. }));
        assert!(matches!(events[1], HwEvent::LoadIdt { size: 2047, .. }));
        assert_eq!(events[2], HwEvent::EnableInterrupts);

        hw.clear();
        assert_eq!(slot.dispatch(KEYBOARD_VECTOR, 0xDEAD), 0xDEAD);
        assert_eq!(handler.calls(), 1);
        assert_eq!(hw.port_writes(), vec![(0x20, 0x20)]);

        manager.deactivate();
        assert_eq!(hw.events(), vec![HwEvent::DisableInterrupts]);
    }
}
