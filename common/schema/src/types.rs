//! Rule constructors, used as `types::number().min(0).max(120).required()`.

use crate::rule::{AnyRule, BooleanRule, NumberRule, StringRule};

pub fn string() -> StringRule {
    StringRule::default()
}

pub fn number() -> NumberRule {
    NumberRule::default()
}

pub fn boolean() -> BooleanRule {
    BooleanRule::default()
}

pub fn any() -> AnyRule {
    AnyRule::default()
}
