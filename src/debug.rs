//! Lifecycle tracing.
//!
//! With the `trace` feature on, control block allocation, pointee destruction
//! and block release are printed to stderr, prefixed with the call site and
//! indented by call depth. Without it the macros compile down to a constant
//! `false` branch.

use std::cell::Cell;

pub(crate) const ENABLED: bool = cfg!(feature = "trace");

pub(crate) const INDENT: usize = 2;

pub(crate) const COLUMN_1: usize = 30;

thread_local! {
    static DBG_INDENT: Cell<usize> = const { Cell::new(0) };
}

pub(crate) fn enter_function() { let _ = DBG_INDENT.try_with(|x| x.set(x.get() + INDENT)); }

pub(crate) fn exit_function()
{
    let _ = DBG_INDENT.try_with(|x| x.set(x.get().saturating_sub(INDENT)));
}

pub(crate) fn dbg_file_line(file: &str, line: u32)
{
    let indent = DBG_INDENT.try_with(Cell::get).unwrap_or(0);
    eprint!(
        "{0:<1$}{2:>3$}",
        format!("{}:{}:", file, line),
        COLUMN_1,
        "",
        indent
    );
}

macro_rules! dbg_println {
    ($fmt:literal) => {
        if $crate::debug::ENABLED {
            $crate::debug::dbg_file_line(file!(), line!());
            eprintln!($fmt);
        }
    };
    ($fmt:literal, $($args:expr),+) => {
        if $crate::debug::ENABLED {
            $crate::debug::dbg_file_line(file!(), line!());
            eprintln!($fmt, $($args),+);
        }
    };
}

macro_rules! dbg_call {
    ($fmt:literal) => {{
        dbg_println!("fn {} {{", $fmt);
        if $crate::debug::ENABLED {
            $crate::debug::enter_function();
        }
    }};
    ($fmt:literal, $($args:expr),+) => {{
        dbg_println!("fn {} {{", format!($fmt, $($args),+));
        if $crate::debug::ENABLED {
            $crate::debug::enter_function();
        }
    }};
}

macro_rules! dbg_return {
    () => {
        if $crate::debug::ENABLED {
            $crate::debug::exit_function();
        }
        dbg_println!("}} => ()");
    };
    ($fmt:literal, $val:expr) => {{
        let res = $val;
        if $crate::debug::ENABLED {
            $crate::debug::exit_function();
        }
        dbg_println!("}} => {}", format!($fmt, res));
        res
    }};
}
