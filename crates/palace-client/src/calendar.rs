use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use crate::models::Memory;
use crate::timezone::local_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntensityTier {
    None,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl IntensityTier {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Tier1,
            2..=3 => Self::Tier2,
            4..=5 => Self::Tier3,
            _ => Self::Tier4,
        }
    }

    pub const fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
            Self::Tier4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayedMonth {
    year: i32,
    month: u32,
}

impl DisplayedMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(self) -> u32 {
        let next_first = self.next().first_day();
        next_first
            .signed_duration_since(self.first_day())
            .num_days()
            .clamp(28, 31) as u32
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub memories: Vec<&'a Memory>,
}

impl DayBucket<'_> {
    pub fn count(&self) -> usize {
        self.memories.len()
    }

    pub fn tier(&self) -> IntensityTier {
        IntensityTier::from_count(self.memories.len())
    }
}

/// One bucket per day of the displayed month, in day order.
#[derive(Debug, Clone)]
pub struct MonthHeatMap<'a> {
    pub month: DisplayedMonth,
    pub days: Vec<DayBucket<'a>>,
}

impl<'a> MonthHeatMap<'a> {
    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket<'a>> {
        if !self.month.contains(date) {
            return None;
        }
        self.days.get(date.day0() as usize)
    }

    /// What a click on `date` hands to the caller. Never touches the network.
    pub fn memories_on(&self, date: NaiveDate) -> Vec<&'a Memory> {
        self.day(date)
            .map(|bucket| bucket.memories.clone())
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.days.iter().map(DayBucket::count).sum()
    }
}

/// Buckets memories by the local calendar day of their creation in `tz`.
pub fn bucket_month<'a>(memories: &'a [Memory], month: DisplayedMonth, tz: Tz) -> MonthHeatMap<'a> {
    let mut days: Vec<DayBucket<'a>> = month
        .first_day()
        .iter_days()
        .take(month.days_in_month() as usize)
        .map(|date| DayBucket {
            date,
            memories: Vec::new(),
        })
        .collect();

    for memory in memories {
        let date = local_date(memory.created_at, tz);
        if !month.contains(date) {
            continue;
        }
        if let Some(bucket) = days.get_mut(date.day0() as usize) {
            bucket.memories.push(memory);
        }
    }

    MonthHeatMap { month, days }
}
