use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{BookedSlot, Service};

/// Removes every slot already booked on `slot_date` from each service,
/// keeping the original slot order. Bookings for other dates are ignored.
pub fn available_slots(services: Vec<Service>, bookings: &[BookedSlot], slot_date: &str) -> Vec<Service> {
    let mut booked: HashMap<&str, HashSet<&str>> = HashMap::new();
    for booking in bookings.iter().filter(|b| b.slot_date == slot_date) {
        booked
            .entry(booking.treatment_name.as_str())
            .or_default()
            .insert(booking.slot_time.as_str());
    }

    debug!(
        "Computing availability for {} services on {} ({} treatments booked)",
        services.len(),
        slot_date,
        booked.len()
    );

    services
        .into_iter()
        .map(|mut service| {
            if let Some(taken) = booked.get(service.name.as_str()) {
                service.slots.retain(|slot| !taken.contains(slot.as_str()));
            }
            service
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn service(name: &str, slots: &[&str]) -> Service {
        Service {
            id: Some(format!("svc-{}", name)),
            name: name.to_string(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            extra: Map::new(),
        }
    }

    fn booking(treatment: &str, date: &str, time: &str) -> BookedSlot {
        BookedSlot {
            treatment_name: treatment.to_string(),
            slot_date: date.to_string(),
            slot_time: time.to_string(),
        }
    }

    const SLOTS: [&str; 4] = ["08:00 AM", "08:30 AM", "09:00 AM", "09:30 AM"];

    #[test]
    fn test_no_bookings_keeps_every_slot() {
        let result = available_slots(vec![service("Cleaning", &SLOTS)], &[], "2024-01-05");
        assert_eq!(result[0].slots, SLOTS);
    }

    #[test]
    fn test_booked_slots_removed_in_order() {
        let bookings = [
            booking("Cleaning", "2024-01-05", "09:00 AM"),
            booking("Cleaning", "2024-01-05", "08:00 AM"),
        ];
        let result = available_slots(vec![service("Cleaning", &SLOTS)], &bookings, "2024-01-05");
        assert_eq!(result[0].slots, vec!["08:30 AM", "09:30 AM"]);
    }

    #[test]
    fn test_bookings_only_affect_their_treatment() {
        let services = vec![service("Cleaning", &SLOTS), service("Whitening", &SLOTS)];
        let bookings = [booking("Whitening", "2024-01-05", "08:30 AM")];

        let result = available_slots(services, &bookings, "2024-01-05");
        assert_eq!(result[0].slots, SLOTS);
        assert_eq!(result[1].slots, vec!["08:00 AM", "09:00 AM", "09:30 AM"]);
    }

    #[test]
    fn test_other_dates_ignored() {
        let bookings = [booking("Cleaning", "2024-01-06", "08:00 AM")];
        let result = available_slots(vec![service("Cleaning", &SLOTS)], &bookings, "2024-01-05");
        assert_eq!(result[0].slots, SLOTS);
    }

    #[test]
    fn test_fully_booked_service_kept_with_no_slots() {
        let bookings: Vec<_> = SLOTS.iter().map(|t| booking("Cleaning", "2024-01-05", t)).collect();
        let result = available_slots(vec![service("Cleaning", &SLOTS)], &bookings, "2024-01-05");
        assert_eq!(result.len(), 1);
        assert!(result[0].slots.is_empty());
    }

    #[test]
    fn test_other_fields_untouched() {
        let mut svc = service("Cleaning", &SLOTS);
        svc.extra.insert("price".to_string(), json!(120));
        let bookings = [booking("Cleaning", "2024-01-05", "08:00 AM")];

        let result = available_slots(vec![svc.clone()], &bookings, "2024-01-05");
        assert_eq!(result[0].id, svc.id);
        assert_eq!(result[0].name, svc.name);
        assert_eq!(result[0].extra, svc.extra);
    }

    #[test]
    fn test_slot_present_iff_unbooked() {
        let services = vec![service("Cleaning", &SLOTS), service("Filling", &SLOTS[..2])];
        let bookings = [
            booking("Cleaning", "2024-01-05", "08:30 AM"),
            booking("Filling", "2024-01-05", "08:00 AM"),
            booking("Filling", "2024-01-05", "11:00 AM"),
            booking("Cleaning", "2024-01-04", "09:00 AM"),
        ];

        let result = available_slots(services.clone(), &bookings, "2024-01-05");
        for (before, after) in services.iter().zip(&result) {
            for slot in &before.slots {
                let is_booked = bookings.iter().any(|b| {
                    b.treatment_name == before.name && b.slot_date == "2024-01-05" && &b.slot_time == slot
                });
                assert_eq!(after.slots.contains(slot), !is_booked, "{} {}", before.name, slot);
            }
        }
    }
}
