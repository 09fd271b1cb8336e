// Utility modules
// Clock abstraction and UTC date helpers shared by the grid engine

pub mod clock;
pub mod date;
