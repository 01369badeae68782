// Domain-layer modules and shared errors/models
pub mod categories {
    pub use crate::categories::*;
}

pub mod relevance {
    pub use crate::relevance::*;
}

pub mod ranking {
    pub use crate::ranking::*;
}

pub mod search {
    pub use crate::search::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
