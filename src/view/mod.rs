pub(crate) mod dot;
