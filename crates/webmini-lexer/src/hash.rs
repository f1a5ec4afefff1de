//! Static name tables.
//!
//! `hashes!` declares an enum of known names with a case-insensitive lookup
//! from bytes and the canonical spelling back. Markup tokenizers attach the
//! resulting variant to tag and attribute tokens so that minifiers compare
//! enum values instead of strings.

/// Declare a name table. Names must be written in lowercase.
///
/// ```
/// webmini_lexer::hashes! {
///     /// Example names.
///     pub enum Name {
///         Width => "width",
///         Height => "height",
///     }
/// }
///
/// assert_eq!(Name::lookup(b"WIDTH"), Some(Name::Width));
/// assert_eq!(Name::Height.as_str(), "height");
/// assert_eq!(Name::lookup(b"depth"), None);
/// ```
#[macro_export]
macro_rules! hashes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),*
        }

        impl $name {
            /// Look a name up, ignoring ASCII case.
            pub fn lookup(name: &[u8]) -> Option<Self> {
                if name.len() > 32 {
                    return None;
                }
                let mut lower = [0u8; 32];
                for (dst, src) in lower.iter_mut().zip(name) {
                    *dst = src.to_ascii_lowercase();
                }
                match &lower[..name.len()] {
                    $(n if n == $text.as_bytes() => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }
        }
    };
}
