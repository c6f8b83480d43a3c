//! Function marshalling: turning typed Rust callables into [`NativeFn`]s.
//!
//! - [`FromArgs`] decodes a call's argument list into a tuple
//! - [`IntoNativeFn`] wraps `Fn(A1..An) -> R`
//! - [`IntoMethod`] wraps `Fn(&T, A1..An) -> R`, receiver in the first slot
//! - [`IntoMethodMut`] wraps `Fn(&mut T, A1..An) -> R`, receiver in the first slot
//! - [`NativeConstructor`] is `Fn(A1..An) -> T`, called once the arguments
//!   are decoded so the result can be written straight into a buffer
//!
//! All of them are implemented for up to eight parameters.

use crate::convert::{FromScript, ToScript};
use crate::error::NativeError;
use crate::runtime::{CallContext, NativeFn};

/// A tuple that can be decoded from a call's arguments.
pub trait FromArgs: Sized {
    /// Number of arguments the tuple consumes.
    const ARITY: usize;

    /// Decode arguments `0..ARITY` without checking the call's arity.
    fn from_args(ctx: &CallContext<'_>) -> Result<Self, NativeError>;
}

/// Plain function marshalling.
pub trait IntoNativeFn<Args, Ret> {
    fn into_native_fn(self) -> NativeFn;
}

/// Marshalling of a method that borrows its receiver.
pub trait IntoMethod<T, Args, Ret> {
    fn into_method(self) -> NativeFn;
}

/// Marshalling of a method that mutates its receiver.
pub trait IntoMethodMut<T, Args, Ret> {
    fn into_method_mut(self) -> NativeFn;
}

/// A constructor of `T` taking the argument tuple `Args`.
pub trait NativeConstructor<T, Args>: Send + Sync + 'static {
    fn construct(&self, args: Args) -> T;
}

macro_rules! impl_marshal {
    ($count:literal; $($arg:ident $idx:tt),*) => {
        impl<$($arg: FromScript),*> FromArgs for ($($arg,)*) {
            const ARITY: usize = $count;

            #[allow(unused_variables)]
            fn from_args(ctx: &CallContext<'_>) -> Result<Self, NativeError> {
                Ok(($(ctx.arg::<$arg>($idx)?,)*))
            }
        }

        impl<Func, Ret, $($arg),*> IntoNativeFn<($($arg,)*), Ret> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: ToScript + 'static,
            $($arg: FromScript + 'static,)*
        {
            fn into_native_fn(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
                    #[allow(non_snake_case)]
                    let ($($arg,)*) = ctx.args::<($($arg,)*)>()?;
                    let ret = (self)($($arg),*);
                    ctx.set_return(ret)
                })
            }
        }

        impl<T, Func, Ret, $($arg),*> IntoMethod<T, ($($arg,)*), Ret> for Func
        where
            T: 'static,
            Func: Fn(&T, $($arg),*) -> Ret + Send + Sync + 'static,
            Ret: ToScript + 'static,
            $($arg: FromScript + 'static,)*
        {
            fn into_method(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
                    ctx.bind_receiver()?;
                    #[allow(non_snake_case)]
                    let ($($arg,)*) = ctx.args::<($($arg,)*)>()?;
                    let ret = (self)(ctx.this::<T>()?, $($arg),*);
                    ctx.set_return(ret)
                })
            }
        }

        impl<T, Func, Ret, $($arg),*> IntoMethodMut<T, ($($arg,)*), Ret> for Func
        where
            T: 'static,
            Func: Fn(&mut T, $($arg),*) -> Ret + Send + Sync + 'static,
            Ret: ToScript + 'static,
            $($arg: FromScript + 'static,)*
        {
            fn into_method_mut(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
                    ctx.bind_receiver()?;
                    #[allow(non_snake_case)]
                    let ($($arg,)*) = ctx.args::<($($arg,)*)>()?;
                    let ret = (self)(ctx.this_mut::<T>()?, $($arg),*);
                    ctx.set_return(ret)
                })
            }
        }

        impl<T, Func, $($arg),*> NativeConstructor<T, ($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> T + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            fn construct(&self, ($($arg,)*): ($($arg,)*)) -> T {
                (self)($($arg),*)
            }
        }
    };
}

impl_marshal!(0;);
impl_marshal!(1; A0 0);
impl_marshal!(2; A0 0, A1 1);
impl_marshal!(3; A0 0, A1 1, A2 2);
impl_marshal!(4; A0 0, A1 1, A2 2, A3 3);
impl_marshal!(5; A0 0, A1 1, A2 2, A3 3, A4 4);
impl_marshal!(6; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_marshal!(7; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_marshal!(8; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);
