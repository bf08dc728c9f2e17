// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::fmt::{self, Display};
use thiserror::Error as DError;

/// The kind of named entity an error refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntityKind {
    User,
    Restaurant,
    Group,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "User"),
            EntityKind::Restaurant => write!(f, "Restaurant"),
            EntityKind::Group => write!(f, "Group"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, DError)]
pub enum ErrorKind {
    #[error("{kind} '{name}' already exists")]
    UniqueViolation { kind: EntityKind, name: String },

    #[error("Referenced row does not exist ({0})")]
    ForeignKeyViolation(String),
}

impl ErrorKind {
    pub fn unique(kind: EntityKind, name: &str) -> Self {
        Self::UniqueViolation {
            kind,
            name: name.into(),
        }
    }

    /// Whether `err` carries a duplicate-name failure.
    pub fn is_unique_violation(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<ErrorKind>(),
            Some(ErrorKind::UniqueViolation { .. })
        )
    }
}
