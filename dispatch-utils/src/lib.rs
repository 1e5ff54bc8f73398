mod cancel;
pub use cancel::*;
mod json;
pub use json::*;
mod workers;
pub use workers::*;
