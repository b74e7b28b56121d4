//! Helper macro for declaring port error enums with snake-case constructors.

/// Declare a `thiserror` enum plus one constructor per variant.
///
/// Struct-like variants get constructors accepting `impl Into<T>` for every
/// field, so callers can pass `&str` where the variant stores a `String`.
macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
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
    define_port_error! {
        pub enum SamplePortError {
            Offline => "adapter offline",
            Rejected { reason: String } => "rejected: {reason}",
            Partial { reason: String, applied: usize } => "partial ({applied}): {reason}",
        }
    }

    #[test]
    fn unit_variant_constructor() {
        assert_eq!(SamplePortError::offline().to_string(), "adapter offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::rejected("duplicate row");
        assert_eq!(err.to_string(), "rejected: duplicate row");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::partial("timeout", 3_usize);
        assert_eq!(err.to_string(), "partial (3): timeout");
    }
}
