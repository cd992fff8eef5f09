//! pf-core: shared foundation for the porous-media workspace.
//!
//! - units: uom SI types used at API boundaries, plus physical constants
//! - numeric: sentinels shared by solver components
//! - ids: grid entity identifiers
//! - error: the error type every crate error collapses into

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{PfError, PfResult};
pub use ids::ElementId;
pub use numeric::HUGE;
