//! Macros to reduce boilerplate in the codebase

/// Generate `Display` and `FromStr` for a string-keyed enum.
///
/// Parsing is case-insensitive. Unknown input is handed to the error
/// constructor as an owned `String`.
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     SortDirection,
///     BidwavesError::invalid_sort_direction,
///     {
///         Ascending => "asc",
///         Descending => "desc",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_ctor:path,
        { $($variant:ident => $str:expr),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::BidwavesError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($error_ctor(s.to_string())),
                }
            }
        }
    };
}
