use uuid::Uuid;

/// Broadcast to seat-map subscribers after a reservation commits at least one seat.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeatsBookedEvent {
    pub showing_id: Uuid,
    pub seat_labels: Vec<String>,
    pub booked_at: i64,
}

impl SeatsBookedEvent {
    pub fn new(showing_id: Uuid, seat_labels: Vec<String>) -> Self {
        Self {
            showing_id,
            seat_labels,
            booked_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let showing_id = Uuid::new_v4();
        let event = SeatsBookedEvent {
            showing_id,
            seat_labels: vec!["A1".to_string(), "A2".to_string()],
            booked_at: 1_700_000_000,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["showing_id"], showing_id.to_string());
        assert_eq!(json["seat_labels"][1], "A2");
        assert_eq!(json["booked_at"], 1_700_000_000);
    }
}
