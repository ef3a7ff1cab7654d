//! Kernel source code generation.
//!
//! Emits the three-input `add` kernel as backend-specific shader source for
//! runtime compilation. Precompiled libraries built from
//! `metal/compute.metal` expose the same entry point.

pub mod msl;
pub mod wgsl;

/// Entry point name shared by every kernel variant.
pub const KERNEL_FN_NAME: &str = "add";

/// Buffer slots: three inputs followed by the result.
pub const INPUT_COUNT: usize = 3;
pub const RESULT_SLOT: usize = INPUT_COUNT;
pub const BINDING_COUNT: usize = RESULT_SLOT + 1;
