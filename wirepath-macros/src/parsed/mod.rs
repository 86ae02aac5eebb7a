#[allow(unused_imports)]
use super::*;

mod field;
mod model;

pub(crate) use field::ParsedField;
#[cfg(test)]
pub(crate) use field::Directive;
pub(crate) use model::ParsedModel;
