// src/models/quota.rs

//! Day-scoped search request counter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Requests used against the provider's daily ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    /// UTC day the counter belongs to
    pub date: NaiveDate,

    pub used: u32,

    pub daily_limit: u32,
}

impl QuotaState {
    pub fn for_date(date: NaiveDate, daily_limit: u32) -> Self {
        Self {
            date,
            used: 0,
            daily_limit,
        }
    }

    /// Reset the counter when `today` is a different day. Returns true on reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        self.date = today;
        self.used = 0;
        true
    }

    /// Record one provider request.
    pub fn record_request(&mut self) {
        self.used = self.used.saturating_add(1);
    }

    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.daily_limit
    }
}
