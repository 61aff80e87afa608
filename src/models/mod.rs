pub mod lead;
pub mod call;
pub mod pipeline;
pub mod rules;

pub use lead::*;
pub use call::*;
pub use pipeline::*;
pub use rules::*;
