//! Endpoint client for the to-do backend.
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | login | GET | `/auth` (query) |
//! | signup | POST | `/signup` (form) |
//! | add / edit task | POST | `/tasks` (JSON) |
//! | delete task | DELETE | `/tasks` (JSON) |
//! | list tasks | GET | `/tasks?id=<user>` |

mod client;
pub mod requests;
pub mod responses;

pub use client::ApiClient;
pub use requests::{AddTaskRequest, DeleteTaskRequest, LoginRequest, SignupRequest, Task, TaskStatus};
pub use responses::{AddTasksResponse, DeleteTaskResponse, IssuesSession, LoginResponse, SignupResponse};
