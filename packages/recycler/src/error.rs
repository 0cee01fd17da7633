use thiserror::Error;

/// Errors reported by the [`Registry`][crate::Registry].
///
/// Only [`Error::DuplicateRegistration`] is an ordinary outcome. The other variants describe a
/// caller that uses a kind in a way its registration does not allow, which is a coding defect.
/// The panicking operations ([`Registry::acquire()`][crate::Registry::acquire],
/// [`Registry::release()`][crate::Registry::release]) turn them into panics; the `try_` variants
/// hand them back as values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A kind was registered a second time. The original registration remains in effect.
    #[error("kind '{kind}' is already registered")]
    DuplicateRegistration {
        /// Name of the item type that identifies the kind.
        kind: &'static str,
    },

    /// A kind was used without ever having been registered.
    #[error("kind '{kind}' is not registered")]
    UnknownKind {
        /// Name of the item type that identifies the kind.
        kind: &'static str,
    },

    /// A kind was acquired with a parameter type that differs from the one its initializer takes.
    #[error(
        "kind '{kind}' is initialized with parameters of type '{registered}' but was acquired with '{requested}'"
    )]
    ParamsMismatch {
        /// Name of the item type that identifies the kind.
        kind: &'static str,

        /// Parameter type the initializer was registered with.
        registered: &'static str,

        /// Parameter type the caller supplied.
        requested: &'static str,
    },
}

/// A specialized `Result` type for registry operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn messages_name_the_kind() {
        let error = Error::UnknownKind { kind: "my::Thing" };
        assert_eq!(error.to_string(), "kind 'my::Thing' is not registered");

        let error = Error::DuplicateRegistration { kind: "my::Thing" };
        assert_eq!(error.to_string(), "kind 'my::Thing' is already registered");
    }

    #[test]
    fn params_mismatch_names_both_types() {
        let error = Error::ParamsMismatch {
            kind: "my::Thing",
            registered: "u32",
            requested: "i64",
        };

        let message = error.to_string();
        assert!(message.contains("'u32'"));
        assert!(message.contains("'i64'"));
    }
}
