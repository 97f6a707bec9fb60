use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" for every engine pass and store mutation.
pub trait Clock {
    /// Current instant, used for created/updated stamps and snapshot age.
    fn now(&self) -> DateTime<Utc>;

    /// The user's calendar day.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a given instant and day. Tests drive the engine with it.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    /// Noon UTC on `today`.
    pub fn on(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        Self { now, today }
    }

    pub fn advanced(&self, by: chrono::Duration) -> Self {
        let now = self.now + by;
        Self {
            now,
            today: now.date_naive().max(self.today),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
