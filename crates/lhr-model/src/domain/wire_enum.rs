//! Declarative generator for wire enumerations.
//!
//! Every enumeration that travels on the wire follows the same contract:
//! - it serializes as its canonical symbolic name, never as an integer;
//! - decoding accepts the canonical name plus any legacy aliases, all of
//!   which normalize to a single variant;
//! - an unrecognized symbol decodes to a designated fallback variant
//!   instead of failing;
//! - every variant has a stable numeric code that is never reused.
//!
//! ```ignore
//! wire_enum! {
//!     /// Doc comment for the enum.
//!     pub enum GatherMode {
//!         fallback Unspecified = 0 => "GATHER_MODE_UNSPECIFIED";
//!         Navigation = 1 => "NAVIGATION" | "navigation",
//!     }
//! }
//! ```

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$fmeta:meta])*
            fallback $fallback:ident = $fcode:literal => $fwire:literal;
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $wire:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(from = "String", into = "String")]
        $vis enum $name {
            $(#[$fmeta])*
            $fallback,
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant other than the fallback, in declaration order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire symbol.
            pub fn as_wire(&self) -> &'static str {
                match self {
                    $name::$fallback => $fwire,
                    $($name::$variant => $wire,)+
                }
            }

            /// Decode a wire symbol. Legacy spellings normalize to their
            /// canonical variant; unknown symbols map to the fallback.
            pub fn from_wire(symbol: &str) -> Self {
                match symbol {
                    $fwire => $name::$fallback,
                    $($wire $(| $alias)* => $name::$variant,)+
                    other => {
                        ::tracing::debug!(
                            wire_enum = stringify!($name),
                            symbol = %other,
                            "unrecognized wire symbol, using fallback"
                        );
                        $name::$fallback
                    }
                }
            }

            /// Stable numeric code.
            pub fn code(&self) -> u32 {
                match self {
                    $name::$fallback => $fcode,
                    $($name::$variant => $code,)+
                }
            }

            /// Look up a variant by numeric code; unknown codes map to the
            /// fallback.
            pub fn from_code(code: u32) -> Self {
                match code {
                    $fcode => $name::$fallback,
                    $($code => $name::$variant,)+
                    _ => $name::$fallback,
                }
            }

            /// Whether this is the fallback variant.
            pub fn is_fallback(&self) -> bool {
                matches!(self, $name::$fallback)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }

        impl From<String> for $name {
            fn from(symbol: String) -> Self {
                $name::from_wire(&symbol)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_wire().to_string()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_wire())
            }
        }
    };
}

pub(crate) use wire_enum;
