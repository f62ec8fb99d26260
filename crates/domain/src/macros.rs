//! Macro for implementing Display and FromStr for tag enums
//!
//! Resource kinds, user statuses and pagination phases all travel as short
//! lowercase tags (in tokens, profiles and logs). This macro gives each of
//! them the same `Display` / `FromStr` pair.
//!
//! # Example
//!
//! ```rust
//! use hubspot_sync_domain::impl_tag_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Membership {
//!     Primary,
//!     Secondary,
//! }
//!
//! impl_tag_conversions!(Membership {
//!     Primary => "primary-member",
//!     Secondary => "secondary-member",
//! });
//!
//! assert_eq!(Membership::Primary.to_string(), "primary-member");
//! assert_eq!("SECONDARY-MEMBER".parse::<Membership>(), Ok(Membership::Secondary));
//! ```

/// Implements Display and FromStr traits for tag enums
///
/// - Display writes the tag exactly as declared
/// - FromStr matches case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_tag_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// The tag this variant is written as.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
