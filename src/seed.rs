use crate::customer::Customer;
use crate::ids::new_id;
use chrono::{DateTime, Utc};

fn customer(
    name: &str,
    tag: &str,
    contact_note: &str,
    locations: Option<&[&str]>,
    now: DateTime<Utc>,
) -> Customer {
    Customer {
        id: new_id("cust"),
        name: name.to_string(),
        tags: vec![tag.to_string()],
        contact_note: Some(contact_note.to_string()),
        locations: locations.map(|names| names.iter().map(|s| s.to_string()).collect()),
        created_at: now,
        updated_at: now,
    }
}

/// Starting customers for a fresh or reset store. Seed data carries no tasks.
pub fn seed_customers(now: DateTime<Utc>) -> Vec<Customer> {
    vec![
        customer(
            "Radisson",
            "Bergen",
            "Driftsteam + markedsansvarlig. Kort svartid.",
            Some(&[
                "Stavanger",
                "Trondheim",
                "Bergen",
                "Tromsø",
                "RED city centre",
                "RED Airport",
                "Conferance Airport",
            ]),
            now,
        ),
        customer(
            "Waynor",
            "Stavanger",
            "Kari + Lars. Liker kjappe statusoppdateringer.",
            None,
            now,
        ),
        customer("Sport1", "Trondheim", "Sesongtopp, rask respons.", None, now),
        customer(
            "Internt",
            "Intern",
            "Oppgaver som kun gjelder interne leveranser.",
            None,
            now,
        ),
        customer(
            "Annet",
            "Diverse",
            "Alt som ikke passer i de faste kundene.",
            None,
            now,
        ),
    ]
}
