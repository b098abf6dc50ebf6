use serde::Serialize;

use super::YearKey;
use crate::decimal::Decimal;

use super::month::MonthStats;

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearStats {
    pub lessons: u32,
    pub participations: u32,
    pub new_students: u32,
    pub new_packs: u32,
    pub new_members: u32,
    pub revenue: Decimal,
}

impl YearStats {
    pub fn absorb(&mut self, month: &MonthStats) {
        self.lessons += month.lessons;
        self.participations += month.participations;
        self.new_students += month.new_students;
        self.new_packs += month.new_packs;
        self.new_members += month.new_members;
        self.revenue += month.revenue;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearRow {
    pub key: YearKey,
    #[serde(flatten)]
    pub stats: YearStats,
}
