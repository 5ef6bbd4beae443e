pub mod aliases {
    pub type Fallible<T> = ::anyhow::Result<T>;

    pub type MaybeOwnedString = ::std::borrow::Cow<'static, str>;
}

pub mod extensions {
    use crate::utils::aliases::Fallible;

    pub trait ArgMatchesExt {
        /// Value of an argument that is required or has a default.
        fn value<T>(&self, id: &str) -> Fallible<&T>
        where
            T: ::core::any::Any + ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static;
    }

    impl ArgMatchesExt for ::clap::ArgMatches {
        fn value<T>(&self, id: &str) -> Fallible<&T>
        where
            T: ::core::any::Any + ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static,
        {
            self.try_get_one::<T>(id)?
                .ok_or_else(|| ::anyhow::anyhow!("missing value for `--{}`", id))
        }
    }

}
