/// `SELECT` over `events e` with the derived `registration_count` column, followed by `$tail`.
macro_rules! event_select {
    ($tail:literal) => {
        concat!(
            "SELECT e.id, e.title, e.slug, e.description, e.location, e.event_date,
                e.registration_deadline, e.max_capacity, e.attendee_list_public, e.registration_open,
                e.image_path, e.banner_path, e.latitude, e.longitude,
                e.created_by, e.created_at, e.updated_at,
                (SELECT COUNT(*) FROM registrations r WHERE r.event_id = e.id) AS registration_count
             FROM events e ",
            $tail
        )
    };
}

pub mod sql_event_repo;
pub mod sql_registration_repo;
pub mod sql_setting_repo;
