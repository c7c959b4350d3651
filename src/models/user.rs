use serde::{Deserialize, Serialize};

/// Signed-in reader shown in the user toolbar. Nothing here authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}
