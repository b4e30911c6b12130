pub mod audit;
pub mod decomposition;
pub mod performance;

pub use audit::*;
pub use decomposition::*;
pub use performance::*;
