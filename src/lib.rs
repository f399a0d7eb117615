//! Client for the Pro Tools scripting (PTSL) gRPC service.
//!
//! [`Dispatcher`] runs the request/response lifecycle of a single command,
//! unary or server-streaming, and folds every outcome into a
//! [`CommandResponse`]. [`PtslClient`] wraps it with typed commands.

pub mod client;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod permissions;
pub mod poller;
pub mod response;
pub mod session;
pub mod transport;

pub use client::PtslClient;
pub use config::{ConfigError, PtslConfig};
pub use dispatch::Dispatcher;
pub use error::{PtslError, Result};
pub use handler::{CommandHandler, EmptyBody, EmptyRequest, JsonCommand};
pub use permissions::{PermissionGroup, Permissions};
pub use ptsl_protos::CommandId;
pub use response::{CommandError, CommandErrorKind, CommandResponse, TaskStatus};
pub use session::SessionContext;
pub use transport::{GrpcTransport, PtslTransport, ResponseStream};
