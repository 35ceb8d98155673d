//! Task commands, one per verb.

mod add;
mod get;
mod list;
mod mv;
mod remove;
mod update;

pub use add::AddTask;
pub use get::GetTask;
pub use list::ListTasks;
pub use mv::MoveTask;
pub use remove::RemoveTask;
pub use update::UpdateTask;
