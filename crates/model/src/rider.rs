use serde::{Deserialize, Serialize};

use crate::id::{HasId, Id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub name: String,
    pub phone: String,
    pub rating: f64,
}

impl HasId for Rider {
    type IdType = i64;
}

pub type RiderId = Id<Rider>;
