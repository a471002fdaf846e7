use thiserror::Error;

/// Failures surfaced by the ownership pointers.
///
/// Only `BadWeakReference` is ever returned. The other two variants name
/// contract violations and are used as panic and assertion messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error
{
    /// A weak handle was promoted after its pointee had been destroyed.
    #[error("bad weak reference: the pointee has already been destroyed")]
    BadWeakReference,

    /// A null handle was dereferenced.
    #[error("dereferenced a null pointer handle")]
    NullDereference,

    /// A counter that was already zero got decremented.
    #[error("reference count released below zero")]
    UseAfterRelease,
}

pub type Result<T> = std::result::Result<T, Error>;
