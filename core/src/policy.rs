/// How an operation distributes its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    /// Fan out over `workers` tasks on the rayon pool.
    Parallel { workers: usize },
}

impl ExecutionPolicy {
    /// Parallel with one worker per available CPU.
    pub fn parallel() -> Self {
        ExecutionPolicy::Parallel { workers: default_workers() }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionPolicy::Parallel { .. })
    }

    /// Worker count; 1 for sequential, never 0.
    pub fn workers(&self) -> usize {
        match *self {
            ExecutionPolicy::Sequential => 1,
            ExecutionPolicy::Parallel { workers } => workers.max(1),
        }
    }
}

pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}
