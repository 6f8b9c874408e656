pub mod context;
pub mod driver;
pub mod interval_map;
pub mod lsp;
mod overlap;
pub mod procedure;
mod retarget;
pub mod tracker;

pub use context::{AnalysisContext, AnalysisSettings};
pub use driver::{DriverBitRange, DriverFlags, DriverKind, DriverList, DriverSource, ValueDriver};
pub use interval_map::DriverIntervalMap;
pub use procedure::AnalyzedProcedure;
pub use tracker::{DriverTracker, IfacePortDriver, InstanceState, PortConnection};
