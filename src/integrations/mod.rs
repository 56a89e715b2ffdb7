//! External service integrations.

pub mod facta_client {
    pub use crate::facta_client::*;
}
