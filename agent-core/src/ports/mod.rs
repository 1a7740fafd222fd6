// agent-core/src/ports/mod.rs

pub mod connector;
pub mod validator;

pub use connector::{Connector, ConnectorError, ResponseMessage};
pub use validator::Validator;
