// ============================================================================
// STATE MODULE - Rc<RefCell> state with change notifications
// ============================================================================

pub mod reactivity;

pub use reactivity::*;
