use chrono::{Duration, NaiveDate};
use progression_types::{CalendarDay, DailyActivity, UserStats};
use std::collections::{BTreeSet, HashMap};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current and longest runs of consecutive active days.
///
/// The current streak is anchored at today, or at yesterday when today has
/// no activity yet (an in-progress day does not break the run).
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let active: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    if active.is_empty() {
        return (0, 0);
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for &date in &active {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    let anchor = if active.contains(&today) {
        Some(today)
    } else if active.contains(&(today - Duration::days(1))) {
        Some(today - Duration::days(1))
    } else {
        None
    };

    let current = match anchor {
        Some(mut day) => {
            let mut streak = 0u32;
            while active.contains(&day) {
                streak += 1;
                day = day - Duration::days(1);
            }
            streak
        }
        None => 0,
    };

    (current, longest)
}

/// Dense day-by-day series for the calendar heatmap: one entry per calendar
/// day over the last `days` days (ending today, inclusive), oldest first,
/// zero-filled where no activity record exists.
pub fn format_activity_for_calendar(
    activities: &[DailyActivity],
    days: u32,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let counts: HashMap<&str, i32> = activities
        .iter()
        .map(|activity| (activity.date.as_str(), activity.total_count()))
        .collect();

    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            let date = date.format(DATE_FORMAT).to_string();
            let count = counts.get(date.as_str()).copied().unwrap_or(0);
            CalendarDay { date, count }
        })
        .collect()
}

/// Fold daily activity rows into a stats snapshot. Rows with an
/// unparseable date still count toward totals but not streaks.
pub fn aggregate_user_stats(activities: &[DailyActivity], today: NaiveDate) -> UserStats {
    let mut stats = UserStats::default();
    let mut dates = Vec::with_capacity(activities.len());

    for activity in activities {
        stats.total_tasks_completed += activity.tasks_completed.max(0) as u32;
        stats.total_goals_completed += activity.goals_completed.max(0) as u32;
        stats.total_events_created += activity.events_created.max(0) as u32;
        if let Ok(date) = NaiveDate::parse_from_str(&activity.date, DATE_FORMAT) {
            dates.push(date);
        }
    }

    stats.days_active = activities.len() as u32;
    let (current, longest) = compute_streaks(&dates, today);
    stats.current_streak = current;
    stats.longest_streak = longest;
    stats
}
