//! External service integrations.

pub mod attribute_rules {
    pub use crate::attribute_rules::*;
}

pub mod partner_client {
    pub use crate::partner_client::*;
}

pub mod partner_mapping {
    pub use crate::partner_mapping::*;
}
