//! Crate-level error type.

use crate::app::AppError;
use crate::client::RuntimeError;
use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::document::DocumentError;
use crate::export::ExportError;
use crate::serializer::SerializeError;
use crate::transport::{ProtocolError, TransportError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error raised by the rendering core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
