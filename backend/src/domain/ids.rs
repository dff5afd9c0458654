//! Typed primary keys.
//!
//! Every table uses a serial `INTEGER` key. Wrapping them keeps a book id from
//! being passed where a collection id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Raw database key.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifier of a book.
    BookId
);
define_id!(
    /// Identifier of an author.
    AuthorId
);
define_id!(
    /// Identifier of a category or language term.
    TermId
);
define_id!(
    /// Identifier of a collection.
    CollectionId
);
define_id!(
    /// Identifier of a user account.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialise_as_bare_integers() {
        let value = serde_json::to_value(BookId::new(42)).expect("serialise id");
        assert_eq!(value, serde_json::json!(42));
        let decoded: UserId = serde_json::from_value(serde_json::json!(7)).expect("decode id");
        assert_eq!(decoded.get(), 7);
    }
}
