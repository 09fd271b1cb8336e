mod app;
pub mod confirm;
pub mod drag;
pub mod overlap;
pub mod palette;
pub mod planner;
pub mod selection;
pub mod snap;
pub mod time_axis;
pub mod views;
pub mod zoom;

pub use app::PlannerApp;
