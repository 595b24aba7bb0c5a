// libs/appointment-cell/tests/availability_test.rs

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use appointment_cell::{
    appointment_title, AppointmentFields, AppointmentStatus, AppointmentStore, AvailabilityEngine,
    AvailabilityError, InMemoryAppointmentStore, SlotKey,
};
use directory_cell::{Adviser, Agency};

fn agency(days: &[&str]) -> Agency {
    Agency {
        id: Uuid::new_v4(),
        name: "Westgate".to_string(),
        address: None,
        phone: None,
        operating_hours_start: Some("09:00".to_string()),
        operating_hours_end: Some("17:00".to_string()),
        operating_days: days.iter().map(|d| d.to_string()).collect(),
    }
}

fn adviser(agency: &Agency, hours: &[&str]) -> Adviser {
    Adviser {
        id: Uuid::new_v4(),
        display_name: "Quinn".to_string(),
        email: "quinn@westgate.test".to_string(),
        agency_id: agency.id,
        specialization_ids: vec![Uuid::new_v4()],
        working_hours: hours.iter().map(|h| h.to_string()).collect(),
        is_active: true,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

async fn book(store: &InMemoryAppointmentStore, adviser: &Adviser, date: NaiveDate, time: &str) -> Uuid {
    let key = SlotKey::parse(time).unwrap();
    let fields = AppointmentFields {
        agency_id: adviser.agency_id,
        specialization_id: adviser.specialization_ids[0],
        adviser_id: adviser.id,
        appointment_date_time: NaiveDateTime::new(date, key.time()),
        time_slot_key: key,
        title: appointment_title("Robin"),
        customer_name: "Robin".to_string(),
        customer_email: "robin@example.com".to_string(),
        customer_phone: "5550000".to_string(),
        notes: None,
        status: AppointmentStatus::Confirmed,
    };
    store.create(fields).await.unwrap().id
}

fn keys(slots: &[appointment_cell::BookableSlot]) -> Vec<String> {
    slots.iter().map(|s| s.key.as_key()).collect()
}

#[tokio::test]
async fn test_tuesday_is_rejected_for_monday_wednesday_agency() {
    let agency = agency(&["monday", "wednesday"]);
    let adviser = adviser(&agency, &["09:00"]);
    let engine = AvailabilityEngine::new(Arc::new(InMemoryAppointmentStore::new()));

    let tuesday = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
    let result = engine.compute_available_slots(&agency, &adviser, tuesday).await;

    assert_matches!(
        result,
        Err(AvailabilityError::NonOperatingDay { weekday, .. }) if weekday == "tuesday"
    );
}

#[tokio::test]
async fn test_booked_ten_o_clock_is_removed() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    let adviser = adviser(&agency, &["09:00", "10:00", "11:00"]);
    book(&store, &adviser, monday(), "1000").await;

    let engine = AvailabilityEngine::new(store.clone());
    let slots = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();

    assert_eq!(keys(&slots), vec!["0900", "1100"]);
    assert_eq!(slots[0].time, "09:00");
    assert_eq!(slots[1].label, "11:00 AM");
}

#[tokio::test]
async fn test_available_is_template_minus_booked_in_order() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    // Stored out of order and in both representations
    let adviser = adviser(&agency, &["1500", "09:00", "13:00", "1100", "10:00"]);
    book(&store, &adviser, monday(), "13:00").await;
    book(&store, &adviser, monday(), "0900").await;

    let engine = AvailabilityEngine::new(store.clone());
    let slots = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();

    assert_eq!(keys(&slots), vec!["1000", "1100", "1500"]);
}

#[tokio::test]
async fn test_other_days_and_advisers_do_not_block() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    let target = adviser(&agency, &["09:00", "10:00"]);
    let colleague = adviser(&agency, &["09:00", "10:00"]);

    book(&store, &colleague, monday(), "09:00").await;
    book(&store, &target, monday() + chrono::Duration::days(7), "10:00").await;

    let engine = AvailabilityEngine::new(store.clone());
    let slots = engine.compute_available_slots(&agency, &target, monday()).await.unwrap();

    assert_eq!(keys(&slots), vec!["0900", "1000"]);
}

#[tokio::test]
async fn test_no_working_hours_gives_empty_list() {
    let agency = agency(&["monday"]);
    let adviser = adviser(&agency, &[]);
    let engine = AvailabilityEngine::new(Arc::new(InMemoryAppointmentStore::new()));

    let slots = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_fully_booked_day_gives_empty_list() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    let adviser = adviser(&agency, &["09:00"]);
    book(&store, &adviser, monday(), "09:00").await;

    let engine = AvailabilityEngine::new(store.clone());
    let slots = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_excluded_appointment_frees_its_slot() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    let adviser = adviser(&agency, &["09:00", "10:00"]);
    let own = book(&store, &adviser, monday(), "09:00").await;

    let engine = AvailabilityEngine::new(store.clone());
    let slots = engine
        .compute_available_slots_excluding(&agency, &adviser, monday(), Some(own))
        .await
        .unwrap();

    assert_eq!(keys(&slots), vec!["0900", "1000"]);
}

#[tokio::test]
async fn test_availability_reflects_bookings_made_between_calls() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let agency = agency(&["monday"]);
    let adviser = adviser(&agency, &["09:00", "10:00"]);
    let engine = AvailabilityEngine::new(store.clone());

    let before = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();
    book(&store, &adviser, monday(), "10:00").await;
    let after = engine.compute_available_slots(&agency, &adviser, monday()).await.unwrap();

    assert_eq!(keys(&before), vec!["0900", "1000"]);
    assert_eq!(keys(&after), vec!["0900"]);
}
