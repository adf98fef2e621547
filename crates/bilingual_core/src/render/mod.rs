//! HTML fragments handed back to the host: the edit panel, the `lang`
//! attribute and the hreflang head links.
//!
//! # Invariants
//! - Every interpolated value goes through `escape`.

pub mod escape;
pub mod head;
pub mod panel;
