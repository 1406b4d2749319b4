mod handoff;
mod traits;

pub(crate) use handoff::*;
pub(crate) use traits::*;
