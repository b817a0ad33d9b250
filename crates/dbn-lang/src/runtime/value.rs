use std::rc::Rc;

use crate::syntax::ast::Definition;

/// What a name can be bound to. Definitions are shared with the tree that
/// declared them, so binding one is a pointer copy.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Command(Rc<Definition>),
    Number(Rc<Definition>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&Rc<Definition>> {
        match self {
            Self::Command(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Rc<Definition>> {
        match self {
            Self::Number(def) => Some(def),
            _ => None,
        }
    }
}
