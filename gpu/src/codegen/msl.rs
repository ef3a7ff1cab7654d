//! Metal Shading Language (MSL) code generation.
//!
//! The generated kernel has the shape:
//!
//! ```metal
//! kernel void add(
//!     device const float* a      [[buffer(0)]],
//!     device const float* b      [[buffer(1)]],
//!     device const float* c      [[buffer(2)]],
//!     device float* result       [[buffer(3)]],
//!     uint id [[thread_position_in_grid]]
//! ) {
//!     result[id] = a[id] + b[id] + c[id];
//! }
//! ```

use super::KERNEL_FN_NAME;

/// Generate MSL source for the `add` kernel.
pub fn emit_add3() -> String {
    let fn_name = KERNEL_FN_NAME;
    format!(
        r#"#include <metal_stdlib>
using namespace metal;

kernel void {fn_name}(
    device const float* a [[buffer(0)]],
    device const float* b [[buffer(1)]],
    device const float* c [[buffer(2)]],
    device float* result   [[buffer(3)]],
    uint id [[thread_position_in_grid]]
) {{
    result[id] = a[id] + b[id] + c[id];
}}
"#
    )
}
