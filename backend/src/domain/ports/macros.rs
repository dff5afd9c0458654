//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters can
//! write `RepositoryError::query(err.to_string())` or `::conflict(7)`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ShelfPortError {
            Offline => "shelf offline",
            Lookup { message: String } => "lookup failed: {message}",
            Clash { row: i32 } => "clashes with row {row}",
            Partial { message: String, row: i32 } => "partial write: {message} (row {row})",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ShelfPortError::offline(), ShelfPortError::Offline);
        assert_eq!(ShelfPortError::offline().to_string(), "shelf offline");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ShelfPortError::lookup("timeout");
        assert_eq!(err.to_string(), "lookup failed: timeout");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ShelfPortError::clash(42);
        assert_eq!(err.to_string(), "clashes with row 42");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ShelfPortError::partial("books", 3);
        assert_eq!(err.to_string(), "partial write: books (row 3)");
    }
}
