//! Share domain entities.

pub mod model;
pub mod reference;

pub use model::{CreateShare, ExpireUnit, Share, ShareStatus};
pub use reference::{ShareDetail, ShareReference, ShareResult};
