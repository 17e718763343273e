#[macro_export]
macro_rules! impl_for_wrapper {
    (Display, $ident: ident) => {
        impl std::fmt::Display for $ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// Defines a newtype wrapper around another type.
///
/// For example, the following invocation:
///
/// ```rust,ignore
/// define_wrapper_type!(pub struct ArtifactName(String));
/// ```
///
/// defines `pub struct ArtifactName(String)` together with constructors, accessors, `Deref`,
/// `AsRef` and the `From` conversions in both directions.
///
/// The harness keys a lot of state by plain strings and addresses: artifact names, event names,
/// method names. Wrapping the ones that act as keys keeps signatures such as
/// `HashMap<ArtifactName, HashMap<AddressKey, DeploymentFuture>>` readable.
///
/// Generics are not supported.
#[macro_export]
macro_rules! define_wrapper_type {
    (
        $(#[$meta: meta])*
        $vis:vis struct $ident: ident($ty: ty)

        $(
            impl $($trait_ident: ident),*
        )?

        ;
    ) => {
        $(#[$meta])*
        $vis struct $ident($ty);

        impl $ident {
            pub fn new(value: impl Into<$ty>) -> Self {
                Self(value.into())
            }

            pub fn into_inner(self) -> $ty {
                self.0
            }

            pub fn as_inner(&self) -> &$ty {
                &self.0
            }
        }

        impl AsRef<$ty> for $ident {
            fn as_ref(&self) -> &$ty {
                &self.0
            }
        }

        impl std::ops::Deref for $ident {
            type Target = $ty;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$ty> for $ident {
            fn from(value: $ty) -> Self {
                Self(value)
            }
        }

        impl From<$ident> for $ty {
            fn from(value: $ident) -> Self {
                value.0
            }
        }

        $(
            $(
                $crate::macros::impl_for_wrapper!($trait_ident, $ident);
            )*
        )?
    };
}

pub use {define_wrapper_type, impl_for_wrapper};
