use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Coach {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Hex color used by the calendar grid.
    pub color: String,
    /// Sparse map: absent weekday means not available.
    #[serde(default)]
    pub availability: HashMap<Weekday, bool>,
    /// Free-text absence note.
    #[serde(default)]
    pub absences: String,
    #[serde(default)]
    pub version: u64,
}

impl Coach {
    pub fn new(name: String, color: String) -> Coach {
        Coach {
            id: ObjectId::new(),
            name,
            color,
            availability: HashMap::new(),
            absences: String::new(),
            version: 0,
        }
    }

    pub fn is_available(&self, weekday: Weekday) -> bool {
        self.availability.get(&weekday).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_availability() {
        let mut coach = Coach::new("Alice".to_owned(), "#fca5a5".to_owned());
        coach.availability.insert(Weekday::Mon, true);
        coach.availability.insert(Weekday::Thu, false);

        assert!(coach.is_available(Weekday::Mon));
        assert!(!coach.is_available(Weekday::Thu));
        assert!(!coach.is_available(Weekday::Sat));
    }
}
