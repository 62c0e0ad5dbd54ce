//! Infrastructure configuration modules.

pub mod engine;
pub mod hedge;
pub mod llm;
pub mod logging;
pub mod settings;
pub mod vault;
pub mod venue;
