mod locks;
mod pipeline;
mod traits;
mod types;

pub(crate) use locks::*;
pub(crate) use pipeline::*;
pub(crate) use traits::*;
pub(crate) use types::*;
