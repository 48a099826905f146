//! Functional traits: the argument tuple and return type of a function under
//! test, and the timed call.

use std::any::TypeId;

use crate::timer::TestTimer;

/// Whether a function produces a value to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// Returns `()`; there is no expected column.
    Void,
    /// Returns a value compared against the expected column.
    Value,
}

impl ReturnKind {
    /// Classify `T` by type identity.
    pub fn of<T: 'static>() -> Self {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            Self::Void
        } else {
            Self::Value
        }
    }

    pub fn is_void(self) -> bool {
        self == Self::Void
    }
}

/// A callable whose arguments arrive as one positional tuple.
///
/// Implemented for every `Fn` of arity 0 through 6, with `Args` the tuple of
/// its parameter types. The argument types are fixed by the function's own
/// type, so a handler built from a function knows its signature without any
/// annotations:
///
/// ```rust
/// use verdict::functional::TestFunction;
///
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// assert_eq!(add.call((2, 3)), 5);
/// ```
pub trait TestFunction<Args> {
    /// The return type.
    type Output;

    /// Unpack `args` positionally and call the function.
    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! test_function {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Ret, $($ty),*> TestFunction<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            fn call(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

test_function!();
test_function!(A a);
test_function!(A a, B b);
test_function!(A a, B b, C c);
test_function!(A a, B b, C c, D d);
test_function!(A a, B b, C c, D d, E e);
test_function!(A a, B b, C c, D d, E e, G g);

/// Call `func` with `args`, measuring only the call itself.
pub fn invoke_with_timer<F, Args>(func: &F, timer: &mut TestTimer, args: Args) -> F::Output
where
    F: TestFunction<Args>,
{
    timer.start();
    let result = func.call(args);
    timer.stop();
    result
}
