use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::transaction::Transaction;

/// Month abbreviations used as year-view bucket labels.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Dashboard granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    /// One calendar month, bucketed by day
    Month,
    /// One calendar year, bucketed by month
    Year,
}

/// A validated reporting window.
///
/// Build it with [`ReportingPeriod::month`] or [`ReportingPeriod::year`];
/// the window bounds are computed once and are always valid dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PeriodSelection", try_from = "PeriodSelection")]
pub struct ReportingPeriod {
    view_mode: ViewMode,
    year: i32,
    /// 0-based month (January = 0). Ignored bounds-wise in year mode.
    month: u32,
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportingPeriod {
    /// Month window. `month` is 0-based (January = 0).
    pub fn month(year: i32, month: u32) -> Result<Self, CoreError> {
        if month > 11 {
            return Err(CoreError::Validation(format!(
                "Month {month} is out of range (expected 0..=11)"
            )));
        }
        let start = first_day(year, month + 1)?;
        let end = last_day_of_month(year, month + 1)?;
        Ok(Self {
            view_mode: ViewMode::Month,
            year,
            month,
            start,
            end,
        })
    }

    /// Calendar-year window.
    pub fn year(year: i32) -> Result<Self, CoreError> {
        let start = first_day(year, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| CoreError::Validation(format!("Year {year} is out of range")))?;
        Ok(Self {
            view_mode: ViewMode::Year,
            year,
            month: 0,
            start,
            end,
        })
    }

    /// Build from a view mode, keeping `month` for later switches back to month view.
    pub fn new(view_mode: ViewMode, year: i32, month: u32) -> Result<Self, CoreError> {
        match view_mode {
            ViewMode::Month => Self::month(year, month),
            ViewMode::Year => {
                if month > 11 {
                    return Err(CoreError::Validation(format!(
                        "Month {month} is out of range (expected 0..=11)"
                    )));
                }
                let mut period = Self::year(year)?;
                period.month = month;
                Ok(period)
            }
        }
    }

    /// The window containing `date`.
    pub fn containing(view_mode: ViewMode, date: NaiveDate) -> Result<Self, CoreError> {
        Self::new(view_mode, date.year(), date.month0())
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn calendar_year(&self) -> i32 {
        self.year
    }

    /// 0-based month.
    pub fn month_index(&self) -> u32 {
        self.month
    }

    /// First day of the window (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of chart buckets: days in the month, or 12 months.
    pub fn bucket_count(&self) -> usize {
        match self.view_mode {
            ViewMode::Month => self.end.day() as usize,
            ViewMode::Year => MONTH_LABELS.len(),
        }
    }

    /// Bucket a date falls into (day-of-month or month-of-year, 0-based).
    pub fn bucket_index(&self, date: NaiveDate) -> usize {
        match self.view_mode {
            ViewMode::Month => date.day0() as usize,
            ViewMode::Year => date.month0() as usize,
        }
    }

    /// Label of the bucket at `index`.
    pub fn bucket_label(&self, index: usize) -> String {
        match self.view_mode {
            ViewMode::Month => (index + 1).to_string(),
            ViewMode::Year => MONTH_LABELS
                .get(index)
                .map(|l| l.to_string())
                .unwrap_or_default(),
        }
    }

    /// The window right before this one, same granularity.
    pub fn previous(&self) -> Result<Self, CoreError> {
        match self.view_mode {
            ViewMode::Month if self.month == 0 => Self::month(self.year - 1, 11),
            ViewMode::Month => Self::month(self.year, self.month - 1),
            ViewMode::Year => Self::new(ViewMode::Year, self.year - 1, self.month),
        }
    }

    /// The window right after this one, same granularity.
    pub fn next(&self) -> Result<Self, CoreError> {
        match self.view_mode {
            ViewMode::Month if self.month == 11 => Self::month(self.year + 1, 0),
            ViewMode::Month => Self::month(self.year, self.month + 1),
            ViewMode::Year => Self::new(ViewMode::Year, self.year + 1, self.month),
        }
    }
}

/// Serialized form of a [`ReportingPeriod`]: only what the user picked.
/// The window bounds are recomputed (and validated) on the way back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub view_mode: ViewMode,
    pub year: i32,
    /// 0-based month
    pub month: u32,
}

impl From<ReportingPeriod> for PeriodSelection {
    fn from(period: ReportingPeriod) -> Self {
        Self {
            view_mode: period.view_mode,
            year: period.year,
            month: period.month,
        }
    }
}

impl TryFrom<PeriodSelection> for ReportingPeriod {
    type Error = CoreError;

    fn try_from(selection: PeriodSelection) -> Result<Self, Self::Error> {
        Self::new(selection.view_mode, selection.year, selection.month)
    }
}

fn first_day(year: i32, month: u32) -> Result<NaiveDate, CoreError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::Validation(format!("Year {year} is out of range")))
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, CoreError> {
    let next_month_start = if month == 12 {
        first_day(year + 1, 1)?
    } else {
        first_day(year, month + 1)?
    };
    next_month_start
        .pred_opt()
        .ok_or_else(|| CoreError::Validation(format!("Year {year} is out of range")))
}

/// One chart bucket (a day in month view, a month in year view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBucket {
    pub label: String,
    /// Settled inflows in this bucket (every category)
    pub inflow: f64,
    /// Settled outflows in this bucket (every category)
    pub outflow: f64,
    /// Carried balance plus every bucket's net up to and including this one
    pub running_balance: f64,
}

/// Everything the dashboard shows for one reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub period: ReportingPeriod,

    /// Realized balance of everything settled before the window
    pub carried_balance: f64,

    /// Transactions dated inside the window, settled or not
    pub period_transactions: Vec<Transaction>,

    /// Settled in-period inflows, vault withdrawals excluded
    pub inflow_total: f64,

    /// Settled in-period outflows, every category
    pub outflow_gross_total: f64,

    /// Settled in-period vault withdrawals
    pub vault_withdrawals_in_period: f64,

    /// `max(0, outflow_gross_total - vault_withdrawals_in_period)`
    pub outflow_net_total: f64,

    /// Vault deposits minus vault withdrawals over the whole history
    pub vault_total: f64,

    /// Every vault deposit/withdrawal, any period, settled or not
    pub vault_ledger: Vec<Transaction>,

    /// `carried_balance + inflow_total - (outflow_gross_total - vault_withdrawals_in_period)`
    pub accumulated_balance: f64,

    /// Share of income kept, in percent (0 when there is no income)
    pub savings_rate_percent: f64,

    pub series: Vec<SeriesBucket>,
}

impl FinanceSummary {
    /// Whether the savings rate reached the user's target percentage.
    pub fn meets_savings_goal(&self, target_percent: f64) -> bool {
        self.savings_rate_percent >= target_percent
    }

    /// In-period transactions whose description contains `query`
    /// (case-insensitive), newest first. An empty query returns all of them.
    pub fn search_period(&self, query: &str) -> Vec<&Transaction> {
        let needle = query.trim().to_lowercase();
        let mut found: Vec<&Transaction> = self
            .period_transactions
            .iter()
            .filter(|t| t.description.to_lowercase().contains(&needle))
            .collect();
        found.reverse();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        found
    }

    /// Transactions in the window that still wait to be settled.
    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.period_transactions.iter().filter(|t| !t.settled)
    }
}
