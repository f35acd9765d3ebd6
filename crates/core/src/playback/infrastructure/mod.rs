pub mod manual_clock;
pub mod sampling_loop;
pub mod system_clock;
