pub(crate) mod factories;

pub(crate) use factories::*;
