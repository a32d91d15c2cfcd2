// Command handlers module
pub mod preview;
pub mod run;

// Re-exports for cleaner imports
pub use preview::execute as preview;
pub use run::execute as run;
