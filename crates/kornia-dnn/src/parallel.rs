//! Execution strategies for plane-wise kernels.

/// How the planes of a tensor are scheduled.
///
/// Planes never share output memory, so every strategy produces the same
/// result; only the wall-clock time differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Process the planes one after the other on the calling thread.
    #[default]
    Serial,
    /// Distribute the planes over the global rayon thread pool.
    ParallelPlanes,
}
