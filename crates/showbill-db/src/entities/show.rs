use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One artist playing one venue at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Show")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTimeWithTimeZone,
}

impl Model {
    /// A show is upcoming only while its start lies strictly in the future;
    /// a show starting exactly at `now` already counts as past.
    pub fn is_upcoming(&self, now: DateTimeWithTimeZone) -> bool {
        self.start_time > now
    }

    pub fn is_past(&self, now: DateTimeWithTimeZone) -> bool {
        !self.is_upcoming(now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id",
        on_delete = "Restrict"
    )]
    Artist,
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id",
        on_delete = "Cascade"
    )]
    Venue,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_show(start_time: DateTimeWithTimeZone) -> Model {
        Model {
            id: 1,
            artist_id: 4,
            venue_id: 1,
            start_time,
        }
    }

    #[test]
    fn test_show_after_now_is_upcoming() {
        let t = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap().fixed_offset();
        let show = make_show(t);
        assert!(show.is_upcoming(t - Duration::seconds(1)));
        assert!(!show.is_past(t - Duration::seconds(1)));
    }

    #[test]
    fn test_show_before_now_is_past() {
        let t = Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap().fixed_offset();
        let show = make_show(t);
        assert!(show.is_past(t + Duration::seconds(1)));
        assert!(!show.is_upcoming(t + Duration::seconds(1)));
    }

    #[test]
    fn test_show_starting_exactly_now_is_past() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset();
        let show = make_show(t);
        assert!(!show.is_upcoming(t));
        assert!(show.is_past(t));
    }

    #[test]
    fn test_comparison_ignores_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap().fixed_offset();
        let plus_two = chrono::FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 19, 0, 0)
            .unwrap();
        // 19:00+02:00 is 17:00Z, an hour before the show
        let show = make_show(utc);
        assert!(show.is_upcoming(plus_two));
    }

    #[test]
    fn test_show_serialization() {
        let t = Utc.with_ymd_and_hms(2019, 6, 15, 23, 0, 0).unwrap().fixed_offset();
        let json = serde_json::to_value(make_show(t)).unwrap();
        assert_eq!(json["artist_id"], 4);
        assert_eq!(json["venue_id"], 1);
        assert_eq!(json["start_time"], "2019-06-15T23:00:00Z");
    }
}
