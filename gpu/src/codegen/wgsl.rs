//! WebGPU Shading Language (WGSL) code generation.
//!
//! The kernel uses `@compute @workgroup_size(256)` with the three inputs and
//! the result bound at `@group(0) @binding(0..=3)`. Invocations past the end
//! of the arrays return early since workgroups are dispatched whole.

use super::KERNEL_FN_NAME;

/// Workgroup size baked into the generated shader.
pub const WORKGROUP_SIZE: u32 = 256;

/// Generate WGSL source for the `add` kernel.
pub fn emit_add3() -> String {
    let fn_name = KERNEL_FN_NAME;
    format!(
        r#"@group(0) @binding(0) var<storage, read> a: array<f32>;
@group(0) @binding(1) var<storage, read> b: array<f32>;
@group(0) @binding(2) var<storage, read> c: array<f32>;
@group(0) @binding(3) var<storage, read_write> result: array<f32>;

@compute @workgroup_size({WORKGROUP_SIZE})
fn {fn_name}(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let id = gid.x;
    if (id >= arrayLength(&result)) {{
        return;
    }}
    result[id] = a[id] + b[id] + c[id];
}}
"#
    )
}
