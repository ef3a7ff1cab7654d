//! One-dimensional dispatch geometry.
//!
//! The grid covers every element exactly once. Threads per group come from
//! the pipeline (Metal) or the shader's fixed workgroup size (WebGPU), clamped
//! to the element count so a single partial group never exceeds the grid.

/// Grid and threadgroup sizes for a 1-D elementwise dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGeometry {
    /// Total work-items (one per element).
    pub grid_width: usize,
    /// Work-items per threadgroup.
    pub threads_per_group: usize,
    /// Number of threadgroups, `ceil(grid_width / threads_per_group)`.
    pub group_count: usize,
}

impl DispatchGeometry {
    /// Geometry for `numel` elements given the platform's per-group limit.
    ///
    /// Returns `None` when there is nothing to dispatch.
    pub fn for_elements(numel: usize, max_threads_per_group: usize) -> Option<Self> {
        if numel == 0 {
            return None;
        }

        let threads_per_group = max_threads_per_group.min(numel).max(1);
        Some(DispatchGeometry {
            grid_width: numel,
            threads_per_group,
            group_count: numel.div_ceil(threads_per_group),
        })
    }

    /// Index range covered by threadgroup `group`.
    pub fn group_range(&self, group: usize) -> std::ops::Range<usize> {
        let start = group * self.threads_per_group;
        let end = (start + self.threads_per_group).min(self.grid_width);
        start.min(end)..end
    }
}
