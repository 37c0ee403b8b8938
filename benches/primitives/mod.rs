mod modulators;
mod scheduler;

pub use modulators::bench_modulators;
pub use scheduler::bench_scheduler;
