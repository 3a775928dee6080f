//! Global descriptor table construction.

use lumaos_abi::{DescriptorTablePointer, SegmentAccess, SegmentDescriptor, SegmentSelector};
use lumaos_lib::{HwAccess, klog_debug};

// Slot 0 is the mandatory null descriptor, slot 1 stays reserved.
const GDT_SLOTS: usize = 4;
const CODE_SLOT: usize = 2;
const DATA_SLOT: usize = 3;

/// The kernel's segment table: a null slot, a reserved slot, and flat
/// 4 GiB ring-0 code and data segments. Segmentation is set up once and
/// then never touched again; paging does the real memory work.
#[repr(C, align(8))]
pub struct GlobalDescriptorTable {
    descriptors: [SegmentDescriptor; GDT_SLOTS],
}

impl GlobalDescriptorTable {
    pub fn new() -> Self {
        let mut descriptors = [SegmentDescriptor::NULL; GDT_SLOTS];
        descriptors[CODE_SLOT] =
            SegmentDescriptor::new(0, 0xFFFF_FFFF, SegmentAccess::KERNEL_CODE);
        descriptors[DATA_SLOT] =
            SegmentDescriptor::new(0, 0xFFFF_FFFF, SegmentAccess::KERNEL_DATA);
        Self { descriptors }
    }

    pub fn descriptor(&self, slot: usize) -> SegmentDescriptor {
        self.descriptors[slot]
    }

    /// Selector for the kernel code segment.
    pub fn code_selector(&self) -> SegmentSelector {
        SegmentSelector::new((CODE_SLOT * 8) as u16)
    }

    /// Selector for the kernel data segment.
    pub fn data_selector(&self) -> SegmentSelector {
        SegmentSelector::new((DATA_SLOT * 8) as u16)
    }

    /// Register image describing this table: byte size minus one, then the
    /// table's own address.
    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::new(
            (GDT_SLOTS * 8 - 1) as u16,
            self.descriptors.as_ptr() as usize as u32,
        )
    }

    /// Hand the table to the CPU.
    ///
    /// # Safety
    /// `self` must outlive every instruction executed while this table is
    /// installed. In practice the table lives in a `'static`.
    pub unsafe fn load(&self, hw: &dyn HwAccess) {
        let pointer = self.pointer();
        klog_debug!(
            "gdt: loading {} slots at 0x{:08X}",
            GDT_SLOTS,
            pointer.base
        );
        unsafe { hw.load_gdt(pointer) };
    }
}

impl Default for GlobalDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==== tests ================================================================
