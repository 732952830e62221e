pub(crate) mod dag;
pub(crate) mod node;
pub(crate) mod stream;
