// Domain-layer modules and shared errors/models
pub mod formalization {
    pub use crate::formalization::*;
}

pub mod offers {
    pub use crate::offers::*;
}

pub mod table_selector {
    pub use crate::table_selector::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
