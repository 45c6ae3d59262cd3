//! `define_port_error!` builds the error enums returned by driven ports.
//!
//! Every variant carries named fields and gets a snake_case constructor
//! whose arguments accept anything convertible into the field type. Adding
//! `for "<subject>"` after the enum name prepends the `Connection` and
//! `Query` variants shared by all storage-backed ports, so callers map them
//! uniformly to `service_unavailable` and `internal_error`.

macro_rules! define_port_error {
    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident for $subject:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        define_port_error! {
            $(#[$outer])*
            pub enum $name {
                /// Storage connection could not be established.
                Connection { message: String } =>
                    ("{subject} connection failed: {message}", subject = $subject),
                /// Query or mutation failed during execution.
                Query { message: String } =>
                    ("{subject} query failed: {message}", subject = $subject),
                $(
                    $(#[$variant_meta])*
                    $variant { $($field : $ty),* } => ($message),
                )*
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        define_port_error! {
            $(#[$outer])*
            pub enum $name {
                $(
                    $(#[$variant_meta])*
                    $variant { $($field : $ty),* } => ($message),
                )*
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* } => ($($display:tt)+)
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($($display)+)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant { $($field : $ty),* });
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        /// Storage-backed port used to exercise the shared variants.
        pub enum PantryError for "pantry repository" {
            /// Shelf already holds the item.
            Stocked { item: String, shelf: u8 } => "{item} is already on shelf {shelf}",
        }
    }

    define_port_error! {
        pub enum ScaleError {
            Overload { grams: u32 } => "scale overloaded at {grams} g",
        }
    }

    #[rstest]
    #[case(PantryError::connection("refused"), "pantry repository connection failed: refused")]
    #[case(PantryError::query("syntax"), "pantry repository query failed: syntax")]
    #[case(PantryError::stocked("flour", 3_u8), "flour is already on shelf 3")]
    fn storage_ports_share_connection_and_query(#[case] error: PantryError, #[case] text: &str) {
        assert_eq!(error.to_string(), text);
    }

    #[rstest]
    fn constructors_convert_their_arguments() {
        let error = ScaleError::overload(5000_u16);
        assert_eq!(error, ScaleError::Overload { grams: 5000 });
        assert_eq!(error.to_string(), "scale overloaded at 5000 g");
    }
}
