// Type definitions shared by the rewriter, the request boundary and the CLI

pub mod outcome;

pub use outcome::*;
