//! Display/FromStr for string-backed domain enums
//!
//! # Example
//!
//! ```rust
//! use carcare_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PopupStatus {
//!     Open,
//!     Blocked,
//!     Closed,
//! }
//!
//! impl_domain_status_conversions!(PopupStatus {
//!     Open => "open",
//!     Blocked => "blocked",
//!     Closed => "closed",
//! });
//!
//! assert_eq!(PopupStatus::Blocked.to_string(), "blocked");
//! assert_eq!("CLOSED".parse::<PopupStatus>(), Ok(PopupStatus::Closed));
//! ```

/// Implements `Display` and case-insensitive `FromStr` from a variant to
/// string table. String representations must be lowercase.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
