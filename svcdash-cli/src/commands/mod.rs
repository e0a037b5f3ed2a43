mod control;
mod doctor;
mod list;

pub use control::run_control;
pub use doctor::run_doctor;
pub use list::run_list;
