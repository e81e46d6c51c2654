// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Pure functions computing subsets and aggregates of a task collection.
//!
//! Nothing here touches a store; callers pass the tasks they already hold.
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Weekday};
use common::{Category, Task};
use serde::Serialize;

/// Label reported by [`top_category`] when there are no tasks.
pub const NO_CATEGORY: &str = "None";

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekBuckets {
    pub this_week: Vec<Task>,
    pub earlier: Vec<Task>,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub percent_complete: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Case-insensitive substring search over title, description and category.
///
/// An empty term keeps every task, in order.
pub fn search_filter(tasks: &[Task], term: &str) -> Vec<Task> {
    if term.is_empty() {
        return tasks.to_vec();
    }
    let needle = term.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            [&t.title, &t.description, &t.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn partition_by_completion(tasks: &[Task]) -> Partition {
    let (completed, pending): (Vec<Task>, Vec<Task>) =
        tasks.iter().cloned().partition(|t| t.completed);
    Partition { pending, completed }
}

/// Splits completed tasks by whether they were completed during the
/// Monday-to-Sunday week containing `now`, in `now`'s timezone.
///
/// Tasks without a completion timestamp land in neither bucket.
pub fn bucket_by_completion_week<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> WeekBuckets {
    let tz = now.timezone();
    let week = now.date_naive().week(Weekday::Mon);
    let (week_start, week_end) = (week.first_day(), week.last_day());

    let mut buckets = WeekBuckets::default();
    for task in tasks {
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        let day = completed_at.with_timezone(&tz).date_naive();
        if (week_start..=week_end).contains(&day) {
            buckets.this_week.push(task.clone());
        } else {
            buckets.earlier.push(task.clone());
        }
    }
    buckets
}

pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let percent_complete = if total == 0 {
        0
    } else {
        (100.0 * completed as f64 / total as f64).round() as u32
    };
    TaskStats {
        total,
        pending: total - completed,
        completed,
        percent_complete,
    }
}

/// Occurrences of each category label, in order of first appearance.
pub fn category_counts(tasks: &[Task]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for task in tasks {
        match index.get(task.category.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&task.category, counts.len());
                counts.push(CategoryCount {
                    category: task.category.clone(),
                    count: 1,
                });
            }
        }
    }
    counts
}

/// The most frequent category label. Ties go to the label seen first.
pub fn top_category(tasks: &[Task]) -> CategoryCount {
    category_counts(tasks).into_iter().fold(
        CategoryCount {
            category: NO_CATEGORY.to_string(),
            count: 0,
        },
        |best, candidate| {
            if candidate.count > best.count {
                candidate
            } else {
                best
            }
        },
    )
}

/// Categories with `task_count` recomputed from `tasks`.
///
/// Labels that match no category are ignored, and categories with no tasks
/// get a count of zero.
pub fn with_task_counts(categories: &[Category], tasks: &[Task]) -> Vec<Category> {
    let counts = category_counts(tasks);
    categories
        .iter()
        .map(|category| {
            let count = counts
                .iter()
                .find(|c| c.category == category.name)
                .map_or(0, |c| c.count);
            Category {
                task_count: u32::try_from(count).unwrap_or(u32::MAX),
                ..category.clone()
            }
        })
        .collect()
}

pub fn is_due_today(task: &Task, today: NaiveDate) -> bool {
    task.due_date == Some(today)
}

/// A pending task whose due date has already passed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};
    use common::Priority;

    fn task(id: i64, title: &str, category: &str, completed: bool) -> Task {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            category: category.to_string(),
            due_date: None,
            completed,
            completed_at: completed.then_some(created_at),
            created_at,
        }
    }

    fn completed_on(id: i64, at: DateTime<Utc>) -> Task {
        Task {
            completed_at: Some(at),
            ..task(id, "done", "Work", true)
        }
    }

    #[test]
    fn test_empty_search_is_identity() {
        let tasks = vec![task(2, "b", "Work", false), task(1, "a", "Home", true)];
        assert_eq!(search_filter(&tasks, ""), tasks);
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let mut described = task(2, "Call", "Home", false);
        described.description = "Ask about the INVOICE".to_string();
        let tasks = vec![
            task(1, "Pay invoice", "Work", false),
            described,
            task(3, "Groceries", "Invoices", false),
            task(4, "Walk dog", "Home", false),
        ];

        let ids: Vec<i64> = search_filter(&tasks, "Invoice").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(search_filter(&tasks, "zebra").is_empty());
    }

    #[test]
    fn test_partition_keeps_order() {
        let tasks = vec![
            task(1, "a", "Work", true),
            task(2, "b", "Work", false),
            task(3, "c", "Work", true),
        ];
        let partition = partition_by_completion(&tasks);
        let pending: Vec<i64> = partition.pending.iter().map(|t| t.id).collect();
        let completed: Vec<i64> = partition.completed.iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![2]);
        assert_eq!(completed, vec![1, 3]);
    }

    #[test]
    fn test_week_buckets() {
        // Wednesday.
        let now = Utc.with_ymd_and_hms(2025, 7, 9, 12, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2025, 7, 7, 0, 30, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2025, 7, 13, 23, 0, 0).unwrap();
        let last_week = Utc.with_ymd_and_hms(2025, 7, 6, 23, 59, 0).unwrap();

        let tasks = vec![
            completed_on(1, monday),
            completed_on(2, now - Duration::hours(1)),
            completed_on(3, last_week),
            completed_on(4, sunday),
            task(5, "open", "Work", false),
        ];
        let buckets = bucket_by_completion_week(&tasks, &now);

        let this_week: Vec<i64> = buckets.this_week.iter().map(|t| t.id).collect();
        let earlier: Vec<i64> = buckets.earlier.iter().map(|t| t.id).collect();
        assert_eq!(this_week, vec![1, 2, 4]);
        assert_eq!(earlier, vec![3]);
    }

    #[test]
    fn test_week_buckets_follow_the_given_timezone() {
        // Monday 01:00 in UTC+2 is still Sunday in UTC.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2025, 7, 9, 12, 0, 0).unwrap();
        let early_monday = offset
            .with_ymd_and_hms(2025, 7, 7, 1, 0, 0)
            .unwrap()
            .with_timezone(&Utc);

        let buckets = bucket_by_completion_week(&[completed_on(1, early_monday)], &now);
        assert_eq!(buckets.this_week.len(), 1);

        let utc_now = now.with_timezone(&Utc);
        let buckets = bucket_by_completion_week(&[completed_on(1, early_monday)], &utc_now);
        assert_eq!(buckets.earlier.len(), 1);
    }

    #[test]
    fn test_stats_on_empty_input() {
        assert_eq!(
            compute_stats(&[]),
            TaskStats {
                total: 0,
                pending: 0,
                completed: 0,
                percent_complete: 0,
            }
        );
    }

    #[test]
    fn test_stats_percentages_round() {
        let mut tasks = vec![
            task(1, "a", "Work", true),
            task(2, "b", "Work", false),
            task(3, "c", "Work", false),
            task(4, "d", "Work", false),
        ];
        let stats = compute_stats(&tasks);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.percent_complete, 25);

        tasks.pop();
        assert_eq!(compute_stats(&tasks).percent_complete, 33);
        tasks[1].completed = true;
        assert_eq!(compute_stats(&tasks).percent_complete, 67);
    }

    #[test]
    fn test_top_category_ties_go_to_first_seen() {
        let tasks = vec![
            task(1, "a", "Home", false),
            task(2, "b", "Work", false),
            task(3, "c", "Work", false),
            task(4, "d", "Home", false),
        ];
        assert_eq!(
            top_category(&tasks),
            CategoryCount {
                category: "Home".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn test_top_category_on_empty_input() {
        let top = top_category(&[]);
        assert_eq!(top.category, NO_CATEGORY);
        assert_eq!(top.count, 0);
    }

    #[test]
    fn test_task_counts_tolerate_dangling_labels() {
        let categories = vec![Category {
            id: 1,
            name: "Work".to_string(),
            color: "#5B4FE5".to_string(),
            task_count: 99,
        }];
        let tasks = vec![
            task(1, "a", "Work", false),
            task(2, "b", "Deleted", false),
            task(3, "c", "Work", true),
        ];
        let counted = with_task_counts(&categories, &tasks);
        assert_eq!(counted[0].task_count, 2);
        assert_eq!(top_category(&tasks).category, "Work");
    }

    #[test]
    fn test_due_flags() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
        let mut late = task(1, "late", "Work", false);
        late.due_date = today.pred_opt();
        let mut now_due = task(2, "today", "Work", false);
        now_due.due_date = Some(today);
        let mut finished = task(3, "done late", "Work", true);
        finished.due_date = today.pred_opt();

        assert!(is_overdue(&late, today));
        assert!(!is_overdue(&now_due, today));
        assert!(is_due_today(&now_due, today));
        assert!(!is_overdue(&finished, today));
        assert!(!is_overdue(&task(4, "undated", "Work", false), today));
    }
}
