pub mod fields;
pub mod patch;
pub mod plan;
pub mod util;
pub mod variants;
pub mod verify;

pub use fields::*;
pub use patch::*;
pub use plan::*;
pub use util::*;
pub use variants::*;
pub use verify::*;
