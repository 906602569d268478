// Domain-layer modules and shared errors/models
pub mod attribute_filter {
    pub use crate::attribute_filter::*;
}

pub mod eligibility {
    pub use crate::eligibility::*;
}

pub mod ingestion {
    pub use crate::ingestion::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod errors {
    pub use crate::errors::*;
}
