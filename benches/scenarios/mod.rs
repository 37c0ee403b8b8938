mod control_loop;

pub use control_loop::bench_control_loop;
