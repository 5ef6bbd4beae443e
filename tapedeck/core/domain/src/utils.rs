pub mod aliases {
    pub type MaybeOwnedString = ::std::borrow::Cow<'static, str>;
    pub type MaybeOwnedVec<T> = ::std::borrow::Cow<'static, [T]>;
}
