pub(crate) mod filters;
pub(crate) mod io;
pub(crate) mod registry;
