// SPDX-License-Identifier: LGPL-3.0-or-later

//! Floating-point machine state for the audio thread.

/// Guard that enables flush-to-zero (FTZ) and denormals-are-zero (DAZ)
/// for the duration of one processing call.
///
/// Recursive filters decaying toward silence produce subnormal numbers,
/// which are orders of magnitude slower on most CPUs. Hosts call
/// [`start`](Self::start) before a block and [`finish`](Self::finish)
/// after it; dropping an active context restores the saved state too.
///
/// # Platform support
///
/// - **x86/x86_64**: Sets FTZ and DAZ bits in the MXCSR register.
/// - **aarch64**: Sets the FZ bit in the FPCR register.
/// - **Other**: No-op.
///
/// # Examples
/// ```
/// use fxchain_dsp_lib::context::DspContext;
///
/// let mut ctx = DspContext::default();
/// ctx.start();
/// // ... process a block ...
/// ctx.finish();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DspContext {
    /// Saved floating-point control register value, restored on `finish()`.
    saved_fpcr: u64,
    active: bool,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const MXCSR_FTZ: u32 = 0x8000;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const MXCSR_DAZ: u32 = 0x0040;

impl DspContext {
    /// Save the control register and enable flush-to-zero. Idempotent.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.enable_ftz();
    }

    /// Restore the state saved by [`start`](Self::start). Idempotent.
    pub fn finish(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.restore_fpcr();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[allow(deprecated)]
    fn enable_ftz(&mut self) {
        unsafe {
            #[cfg(target_arch = "x86")]
            use core::arch::x86::{_mm_getcsr, _mm_setcsr};
            #[cfg(target_arch = "x86_64")]
            use core::arch::x86_64::{_mm_getcsr, _mm_setcsr};

            let csr = _mm_getcsr();
            self.saved_fpcr = csr as u64;
            _mm_setcsr(csr | MXCSR_FTZ | MXCSR_DAZ);
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[allow(deprecated)]
    fn restore_fpcr(&self) {
        unsafe {
            #[cfg(target_arch = "x86")]
            use core::arch::x86::_mm_setcsr;
            #[cfg(target_arch = "x86_64")]
            use core::arch::x86_64::_mm_setcsr;

            _mm_setcsr(self.saved_fpcr as u32);
        }
    }

    #[cfg(target_arch = "aarch64")]
    fn enable_ftz(&mut self) {
        unsafe {
            let fpcr: u64;
            core::arch::asm!("mrs {}, fpcr", out(reg) fpcr);
            self.saved_fpcr = fpcr;
            // FZ is bit 24.
            core::arch::asm!("msr fpcr, {}", in(reg) fpcr | (1u64 << 24));
        }
    }

    #[cfg(target_arch = "aarch64")]
    fn restore_fpcr(&self) {
        unsafe {
            core::arch::asm!("msr fpcr, {}", in(reg) self.saved_fpcr);
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    fn enable_ftz(&mut self) {}

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    fn restore_fpcr(&self) {}
}

impl Drop for DspContext {
    fn drop(&mut self) {
        if self.active {
            self.restore_fpcr();
        }
    }
}
