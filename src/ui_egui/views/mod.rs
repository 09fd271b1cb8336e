// Views over the planner state
// Only the lane grid for now; it owns layout, hit testing and painting

pub mod grid_view;
