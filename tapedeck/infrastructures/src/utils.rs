pub mod aliases {
    pub type Fallible<T> = ::anyhow::Result<T>;

    pub type MaybeOwnedString = ::std::borrow::Cow<'static, str>;
    pub type MaybeOwnedPath = ::std::borrow::Cow<'static, ::std::path::Path>;
    pub type MaybeOwnedVec<T> = ::std::borrow::Cow<'static, [T]>;

    pub type BoxedStream<T> =
        ::std::pin::Pin<::std::boxed::Box<dyn ::futures::Stream<Item = T> + ::core::marker::Send>>;
}

pub mod extensions {
    use crate::utils::aliases::Fallible;

    pub trait OptionExt<T> {
        fn ok(self) -> Fallible<T>;
    }

    impl<T> OptionExt<T> for Option<T> {
        #[track_caller]
        fn ok(self) -> Fallible<T> {
            match self {
                Some(val) => Ok(val),
                None => {
                    let location = ::std::panic::Location::caller();
                    Err(::anyhow::anyhow!(
                        "called `OptionExt::ok()` on a `None` value at {}:{}:{}",
                        location.file(),
                        location.line(),
                        location.column()
                    ))
                },
            }
        }
    }
}

pub mod text {
    /// Shortens `line` to at most `width` characters, marking the cut with an ellipsis.
    pub fn truncate(line: &str, width: usize) -> ::std::borrow::Cow<'_, str> {
        if line.chars().count() <= width {
            return ::std::borrow::Cow::Borrowed(line);
        }

        let cut = line
            .char_indices()
            .nth(width.saturating_sub(1))
            .map(|(idx, _)| idx)
            .unwrap_or(line.len());

        ::std::borrow::Cow::Owned(format!("{}…", &line[..cut]))
    }

}
