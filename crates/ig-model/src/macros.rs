//! Helper macros shared by the entity modules.

/// Adds `as_str` and a case-insensitive `parse` to a fieldless enum,
/// mapping each variant to the name written in XML.
macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $ty {
            /// Returns the name as written in XML.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Parses a name, case-insensitively.
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                [$(Self::$variant),*]
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            }
        }
    };
}

pub(crate) use str_enum;
