//! Small field-access macros used throughout the handler modules.
//!
//! These are thin sugar over a `WithVfpu` accessor, not magic. There's no
//! need for a mutable-borrow-juggling macro for memory access (the host
//! traits in [`crate::host`] already take `&mut` cleanly), so only the
//! register-cube and control-register accessors get this treatment.

/// Read or write a control register by name, e.g. `ctrl!(get CTRL_CC, regs)`.
macro_rules! ctrl {
    (get $name:ident, $regs:expr) => {{
        $regs.ctrl[crate::cube::$name]
    }};
    (set $name:ident, $regs:expr, $val:expr) => {{
        $regs.ctrl[crate::cube::$name] = $val
    }};
}

pub(crate) use ctrl;
