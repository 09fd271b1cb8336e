// Module exports for models
// Plain records mirrored from the persistence service

pub mod calendar_event;
pub mod interval;
pub mod lane;
pub mod parent_event;
pub mod settings;
pub mod task;
