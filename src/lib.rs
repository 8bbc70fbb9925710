pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod result;
pub mod source;
pub mod transport;

pub use client::{Client, RequestBody};
pub use commands::{
    Command, CommandName, CommandSet, ConvertOptions, ResizeMethod, ResizeOption,
    TransformOptions,
};
pub use config::Config;
pub use error::{Result, TinifyError};
pub use formats::ImageType;
pub use result::{ImageResult, ResultMeta};
pub use source::Source;
pub use transport::{resolve_proxy, ProxyCandidates, ProxyEnv, ProxyOrigin, ProxyRoute};
