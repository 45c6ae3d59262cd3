//! Database-assigned integer identifiers.
//!
//! Recipes, ingredients and tags are keyed by `BIGSERIAL` columns. Each gets
//! its own newtype so a tag id can never be passed where a recipe id is
//! expected.

macro_rules! define_serial_id {
    (
        $(#[$outer:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw integer value as stored.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use define_serial_id;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    define_serial_id! {
        /// Identifier used only by these tests.
        pub struct SampleId;
    }

    #[rstest]
    fn parses_and_displays() {
        let id: SampleId = "42".parse().expect("numeric id");
        assert_eq!(id, SampleId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
    }

    #[rstest]
    fn serialises_as_bare_number() {
        let value = serde_json::to_value(SampleId::new(7)).expect("serialise");
        assert_eq!(value, serde_json::json!(7));
    }

    #[rstest]
    fn rejects_non_numeric_text() {
        assert!("seven".parse::<SampleId>().is_err());
    }
}
