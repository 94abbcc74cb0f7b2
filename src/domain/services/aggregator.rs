use serde::Serialize;
use crate::domain::models::schedule::{DayOfWeek, ScheduleType, UnifiedSchedule};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Admin-side schedule filter. Absent fields do not constrain; present ones are ANDed.
#[derive(Debug, Default, Clone)]
pub struct ScheduleFilter {
    pub schedule_type: Option<ScheduleType>,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    pub is_available: Option<bool>,
    pub search: Option<String>,
}

impl ScheduleFilter {
    pub fn matches(&self, schedule: &UnifiedSchedule) -> bool {
        if self.schedule_type.is_some_and(|t| t != schedule.schedule_type()) {
            return false;
        }
        if let Some(teacher_id) = &self.teacher_id
            && schedule.teacher_id() != Some(teacher_id.as_str())
        {
            return false;
        }
        if let Some(venue_id) = &self.venue_id
            && schedule.venue_id() != Some(venue_id.as_str())
        {
            return false;
        }
        if self.day_of_week.is_some_and(|d| d != schedule.day_of_week) {
            return false;
        }
        if self.is_available.is_some_and(|a| a != schedule.is_available) {
            return false;
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = [schedule.teacher_name(), schedule.venue_name()]
                .into_iter()
                .flatten()
                .any(|name| name.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Keeps matching schedules in their original order.
    pub fn apply(&self, schedules: Vec<UnifiedSchedule>) -> Vec<UnifiedSchedule> {
        schedules.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Monday first, then by start time.
pub fn sort_schedules(schedules: &mut [UnifiedSchedule]) {
    schedules.sort_by_key(|s| s.sort_key());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

pub fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>) -> (Vec<T>, Pagination) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total = items.len() as u64;
    let pages = total.div_ceil(limit as u64);

    let skip = (page as usize - 1).saturating_mul(limit as usize);
    let data = items.into_iter().skip(skip).take(limit as usize).collect();

    (data, Pagination { page, limit, total, pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::ScheduleKind;
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn teacher(id: &str, name: &str, venue: &str, day: DayOfWeek, hour: u32) -> UnifiedSchedule {
        UnifiedSchedule::new(
            ScheduleKind::Teacher {
                teacher_id: id.into(),
                venue_id: Some(format!("venue-{}", venue)),
                service_type_id: None,
                teacher_name: Some(name.into()),
                venue_name: Some(venue.into()),
                service_type_name: None,
            },
            day,
            t(hour),
            t(hour + 1),
            10,
        )
    }

    fn fixtures() -> Vec<UnifiedSchedule> {
        let mut closed = UnifiedSchedule::new(
            ScheduleKind::General { name: "Holiday".into(), description: None },
            DayOfWeek::Monday,
            t(8),
            t(9),
            1,
        );
        closed.is_available = false;

        vec![
            teacher("t1", "Lucía", "Miraflores", DayOfWeek::Wednesday, 9),
            teacher("t2", "Marco", "Barranco", DayOfWeek::Monday, 18),
            teacher("t1", "Lucía", "Barranco", DayOfWeek::Monday, 7),
            UnifiedSchedule::new(
                ScheduleKind::Venue { venue_id: "venue-Barranco".into(), session_duration_min: Some(60), venue_name: Some("Barranco".into()) },
                DayOfWeek::Sunday,
                t(10),
                t(12),
                20,
            ),
            closed,
        ]
    }

    #[test]
    fn test_filter_by_day() {
        let result = ScheduleFilter { day_of_week: Some(DayOfWeek::Monday), ..Default::default() }.apply(fixtures());
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|s| s.day_of_week == DayOfWeek::Monday));
    }

    #[test]
    fn test_filter_by_type_and_teacher() {
        let filter = ScheduleFilter {
            schedule_type: Some(ScheduleType::Teacher),
            teacher_id: Some("t1".into()),
            ..Default::default()
        };
        let result = filter.apply(fixtures());
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|s| s.teacher_id() == Some("t1")));
        // order preserved
        assert_eq!(result[0].day_of_week, DayOfWeek::Wednesday);
    }

    #[test]
    fn test_filter_by_venue_availability_and_search() {
        let by_venue = ScheduleFilter { venue_id: Some("venue-Barranco".into()), ..Default::default() }.apply(fixtures());
        assert_eq!(by_venue.len(), 3);

        let available = ScheduleFilter { is_available: Some(false), ..Default::default() }.apply(fixtures());
        assert_eq!(available.len(), 1);

        let search = ScheduleFilter { search: Some("luc".into()), ..Default::default() }.apply(fixtures());
        assert_eq!(search.len(), 2);

        let by_venue_name = ScheduleFilter { search: Some("MIRA".into()), ..Default::default() }.apply(fixtures());
        assert_eq!(by_venue_name.len(), 1);

        assert_eq!(ScheduleFilter::default().apply(fixtures()).len(), 5);
    }

    #[test]
    fn test_sorts_monday_first_then_time() {
        let mut schedules = fixtures();
        sort_schedules(&mut schedules);
        let keys: Vec<_> = schedules.iter().map(|s| (s.day_of_week, s.start_time)).collect();
        assert_eq!(
            keys,
            vec![
                (DayOfWeek::Monday, t(7)),
                (DayOfWeek::Monday, t(8)),
                (DayOfWeek::Monday, t(18)),
                (DayOfWeek::Wednesday, t(9)),
                (DayOfWeek::Sunday, t(10)),
            ]
        );
    }

    #[test]
    fn test_pagination() {
        let (page, meta) = paginate((1..=45).collect::<Vec<_>>(), Some(3), None);
        assert_eq!(page, (41..=45).collect::<Vec<_>>());
        assert_eq!(meta, Pagination { page: 3, limit: 20, total: 45, pages: 3 });

        let (page, meta) = paginate((1..=5).collect::<Vec<_>>(), Some(0), Some(500));
        assert_eq!(page.len(), 5);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 100);

        let (empty, meta) = paginate(Vec::<u8>::new(), None, None);
        assert!(empty.is_empty());
        assert_eq!(meta.pages, 0);
    }
}
