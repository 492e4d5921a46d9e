mod bounding_box;
pub use self::bounding_box::*;

pub mod task_scheduling;
pub mod thread_dispatcher;
