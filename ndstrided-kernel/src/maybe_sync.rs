//! Thread-safety bounds that only bind under the `parallel` feature.
//!
//! Kernel signatures ask for [`MaybeSync`] callbacks and [`MaybeSendSync`]
//! elements. With `parallel` these mean `Sync` and `Send + Sync`; without it
//! they hold for every type, so `Rc`-holding closures still work.

macro_rules! conditional_bound {
    ($(#[$doc:meta])* $name:ident: $($bound:path),+) => {
        $(#[$doc])*
        #[cfg(feature = "parallel")]
        pub trait $name: $($bound +)+ {}
        #[cfg(feature = "parallel")]
        impl<T: $($bound +)+ ?Sized> $name for T {}

        $(#[$doc])*
        #[cfg(not(feature = "parallel"))]
        pub trait $name {}
        #[cfg(not(feature = "parallel"))]
        impl<T: ?Sized> $name for T {}
    };
}

conditional_bound!(
    /// `Send` when the `parallel` feature is on.
    MaybeSend: Send
);
conditional_bound!(
    /// `Sync` when the `parallel` feature is on.
    MaybeSync: Sync
);
conditional_bound!(
    /// `Send + Sync` when the `parallel` feature is on.
    MaybeSendSync: Send, Sync
);

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded<T: MaybeSend + MaybeSync + MaybeSendSync + ?Sized>() {}

    #[test]
    fn test_element_types_qualify() {
        bounded::<f64>();
        bounded::<ndstrided_traits::Scalar>();
        bounded::<dyn Fn(f64) -> f64 + Send + Sync>();
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_rc_qualifies_without_parallel() {
        bounded::<std::rc::Rc<f64>>();
    }
}
