//! External service integrations.

pub mod providers {
    pub use crate::providers::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod category_cache {
    pub use crate::category_cache::*;
}
