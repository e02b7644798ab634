#![doc = include_str!("../README.md")]

use cfg_if::cfg_if;

mod compiler;
pub mod resolution;

pub use compiler::*;

cfg_if! {
    if #[cfg(windows)] {
        #[path = "native/windows.rs"]
        #[doc(hidden)]
        pub mod windows;
        pub use windows as os;
    } else if #[cfg(unix)] {
        #[path = "native/unix.rs"]
        #[doc(hidden)]
        pub mod unix;
        pub use unix as os;
    } else {
        compile_error!("unsupported OS for compiling")
    }
}
