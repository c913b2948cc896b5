pub mod add;
pub mod delete;
pub mod list;
pub mod next;
pub mod review;
