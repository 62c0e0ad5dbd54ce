//! Port definitions for the hexagonal architecture.
//!
//! Outbound ports are the collaborators the decision engine consumes:
//! rate venues, the risk assessor, the vault, execution strategies, and
//! the audit sink. The adapter layer implements them.

pub mod outbound;
