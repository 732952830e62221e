pub(crate) mod error;
pub(crate) mod escape;
pub(crate) mod hash;
pub(crate) mod value;
