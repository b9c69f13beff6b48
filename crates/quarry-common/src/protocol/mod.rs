pub mod error;
pub mod requests;
pub mod responses;
#[cfg(feature = "rpc")]
pub mod rpc;

#[cfg(test)]
mod tests;

pub use error::{QuarryError, Result};
pub use requests::{Body, Method, RequestEnvelope};
pub use responses::{RawResponse, ResponseResult};
#[cfg(feature = "rpc")]
pub use rpc::{RestRequest, RestResponse, RpcMethod};
