use tracing::info;
use uuid::Uuid;

use directory_cell::{Adviser, Agency, InMemoryDirectory, Specialization};

pub const HIGH_STREET_AGENCY_ID: Uuid = Uuid::from_u128(0x6a1c_0000_0000_4000_8000_0000_0000_0001);
pub const HARBOUR_AGENCY_ID: Uuid = Uuid::from_u128(0x6a1c_0000_0000_4000_8000_0000_0000_0002);

pub const TAX_SPECIALIZATION_ID: Uuid = Uuid::from_u128(0x5bec_0000_0000_4000_8000_0000_0000_0001);
pub const PENSIONS_SPECIALIZATION_ID: Uuid = Uuid::from_u128(0x5bec_0000_0000_4000_8000_0000_0000_0002);
pub const MORTGAGES_SPECIALIZATION_ID: Uuid = Uuid::from_u128(0x5bec_0000_0000_4000_8000_0000_0000_0003);

pub const TAYLOR_ADVISER_ID: Uuid = Uuid::from_u128(0xad71_0000_0000_4000_8000_0000_0000_0001);
pub const PATEL_ADVISER_ID: Uuid = Uuid::from_u128(0xad71_0000_0000_4000_8000_0000_0000_0002);
pub const OKAFOR_ADVISER_ID: Uuid = Uuid::from_u128(0xad71_0000_0000_4000_8000_0000_0000_0003);

fn hours(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Fills an in-memory directory with a small fixed data set so the wizard is
/// usable without Supabase. Ids are stable across restarts.
pub async fn seed_demo_directory(directory: &InMemoryDirectory) {
    directory.insert_agency(Agency {
        id: HIGH_STREET_AGENCY_ID,
        name: "High Street".to_string(),
        address: Some("12 High Street".to_string()),
        phone: Some("+441234567890".to_string()),
        operating_hours_start: Some("09:00".to_string()),
        operating_hours_end: Some("17:00".to_string()),
        operating_days: vec!["monday".to_string(), "wednesday".to_string(), "friday".to_string()],
    }).await;
    directory.insert_agency(Agency {
        id: HARBOUR_AGENCY_ID,
        name: "Harbour Road".to_string(),
        address: Some("3 Harbour Road".to_string()),
        phone: None,
        operating_hours_start: Some("10:00".to_string()),
        operating_hours_end: Some("16:00".to_string()),
        operating_days: vec!["tuesday".to_string(), "thursday".to_string()],
    }).await;

    for (id, label) in [
        (TAX_SPECIALIZATION_ID, "Tax"),
        (PENSIONS_SPECIALIZATION_ID, "Pensions"),
        (MORTGAGES_SPECIALIZATION_ID, "Mortgages"),
    ] {
        directory.insert_specialization(Specialization { id, label: label.to_string() }).await;
    }

    directory.insert_adviser(Adviser {
        id: TAYLOR_ADVISER_ID,
        display_name: "Sam Taylor".to_string(),
        email: "sam.taylor@highstreet.example".to_string(),
        agency_id: HIGH_STREET_AGENCY_ID,
        specialization_ids: vec![TAX_SPECIALIZATION_ID, PENSIONS_SPECIALIZATION_ID],
        working_hours: hours(&["09:00", "10:00", "11:00"]),
        is_active: true,
    }).await;
    directory.insert_adviser(Adviser {
        id: PATEL_ADVISER_ID,
        display_name: "Priya Patel".to_string(),
        email: "priya.patel@highstreet.example".to_string(),
        agency_id: HIGH_STREET_AGENCY_ID,
        specialization_ids: vec![MORTGAGES_SPECIALIZATION_ID],
        working_hours: hours(&["1300", "1400", "1500"]),
        is_active: true,
    }).await;
    directory.insert_adviser(Adviser {
        id: OKAFOR_ADVISER_ID,
        display_name: "Chidi Okafor".to_string(),
        email: "chidi.okafor@harbour.example".to_string(),
        agency_id: HARBOUR_AGENCY_ID,
        specialization_ids: vec![TAX_SPECIALIZATION_ID],
        working_hours: hours(&["10:00", "11:00", "14:00", "15:00"]),
        is_active: true,
    }).await;

    info!("Seeded demo directory: 2 agencies, 3 specializations, 3 advisers");
}
