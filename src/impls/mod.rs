mod providers;
mod voice;

pub(crate) use providers::*;
